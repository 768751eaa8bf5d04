use crate::common::command::{init_repository_dir, run_bit_command, tracked_paths};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn keep_going_with_ignore_errors(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    init_repository_dir.child("untracked.txt").write_str("new")?;
    init_repository_dir.child("dst").create_dir_all()?;

    run_bit_command(
        init_repository_dir.path(),
        &["mv", "-k", "untracked.txt", "1.txt", "missing.txt", "dst"],
    )
    .assert()
    .failure()
    .code(1)
    .stderr("");

    init_repository_dir.child("dst/1.txt").assert("one");
    init_repository_dir.child("untracked.txt").assert("new");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["a/2.txt", "a/b/3.txt", "dst/1.txt"]
    );

    Ok(())
}

#[rstest]
fn keep_going_without_failures_succeeds(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "-k", "1.txt", "one.txt"])
        .assert()
        .success();

    init_repository_dir.child("one.txt").assert("one");

    Ok(())
}
