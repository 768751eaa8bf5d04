use crate::common::command::{init_repository_dir, run_bit_command, staged_files};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn dry_run_changes_nothing(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let before = staged_files(init_repository_dir.path());

    run_bit_command(init_repository_dir.path(), &["mv", "-n", "1.txt", "one.txt"])
        .assert()
        .success()
        .stdout("Checking rename of '1.txt' to 'one.txt'\nRenaming 1.txt to one.txt\n");

    init_repository_dir.child("1.txt").assert("one");
    init_repository_dir.child("one.txt").assert(predicates::path::missing());
    init_repository_dir
        .child(".git/index.lock")
        .assert(predicates::path::missing());
    assert_eq!(staged_files(init_repository_dir.path()), before);

    Ok(())
}

#[rstest]
fn dry_run_lists_expanded_directories(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "--dry-run", "a", "z"])
        .assert()
        .success()
        .stdout(
            "Checking rename of 'a' to 'z'\n\
            Checking rename of 'a/2.txt' to 'z/2.txt'\n\
            Checking rename of 'a/b/3.txt' to 'z/b/3.txt'\n\
            Renaming a to z\n\
            Renaming a/2.txt to z/2.txt\n\
            Renaming a/b/3.txt to z/b/3.txt\n",
        );

    init_repository_dir.child("a/2.txt").assert("two");

    Ok(())
}
