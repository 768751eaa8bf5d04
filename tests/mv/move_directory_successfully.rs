use crate::common::command::{init_repository_dir, run_bit_command, tracked_paths};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn move_directory_successfully(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "a", "z"])
        .assert()
        .success();

    init_repository_dir.child("a").assert(predicates::path::missing());
    init_repository_dir.child("z/2.txt").assert("two");
    init_repository_dir.child("z/b/3.txt").assert("three");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["1.txt", "z/2.txt", "z/b/3.txt"]
    );

    Ok(())
}

#[rstest]
fn move_directory_into_existing_directory(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    init_repository_dir.child("dst").create_dir_all()?;

    run_bit_command(init_repository_dir.path(), &["mv", "-v", "a/b", "dst"])
        .assert()
        .success()
        .stdout("Renaming a/b to dst/b\nRenaming a/b/3.txt to dst/b/3.txt\n");

    init_repository_dir.child("dst/b/3.txt").assert("three");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["1.txt", "a/2.txt", "dst/b/3.txt"]
    );

    Ok(())
}

#[rstest]
fn untracked_files_travel_with_their_directory(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    init_repository_dir.child("a/untracked.txt").write_str("new")?;

    run_bit_command(init_repository_dir.path(), &["mv", "a", "z"])
        .assert()
        .success();

    init_repository_dir.child("z/untracked.txt").assert("new");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["1.txt", "z/2.txt", "z/b/3.txt"]
    );

    Ok(())
}
