use crate::common::command::{init_repository_dir, run_bit_command, tracked_paths};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn existing_destination_is_refused(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "a/2.txt"])
        .assert()
        .failure()
        .code(128)
        .stderr("fatal: destination exists, source=1.txt, destination=a/2.txt\n");

    init_repository_dir.child("a/2.txt").assert("two");

    Ok(())
}

#[rstest]
fn overwrite_with_force(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "-f", "-v", "1.txt", "a/2.txt"])
        .assert()
        .success()
        .stdout("Renaming 1.txt to a/2.txt\n")
        .stderr(predicates::str::contains("overwriting 'a/2.txt'"));

    init_repository_dir.child("1.txt").assert(predicates::path::missing());
    init_repository_dir.child("a/2.txt").assert("one");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["a/2.txt", "a/b/3.txt"]
    );

    Ok(())
}

#[rstest]
fn directories_are_never_overwritten(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    init_repository_dir.child("dst/1.txt").create_dir_all()?;

    run_bit_command(init_repository_dir.path(), &["mv", "-f", "1.txt", "dst"])
        .assert()
        .failure()
        .code(128)
        .stderr("fatal: Cannot overwrite, source=1.txt, destination=dst/1.txt\n");

    Ok(())
}
