use crate::common::command::{init_repository_dir, run_bit_command, tracked_paths};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn move_from_subdirectory(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(&init_repository_dir.path().join("a"), &["mv", "2.txt", "b/renamed.txt"])
        .assert()
        .success();

    init_repository_dir.child("a/b/renamed.txt").assert("two");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["1.txt", "a/b/3.txt", "a/b/renamed.txt"]
    );

    Ok(())
}

#[rstest]
fn move_to_the_parent_directory(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(&init_repository_dir.path().join("a/b"), &["mv", "-v", "3.txt", ".."])
        .assert()
        .success()
        .stdout("Renaming a/b/3.txt to a/3.txt\n");

    init_repository_dir.child("a/3.txt").assert("three");

    Ok(())
}
