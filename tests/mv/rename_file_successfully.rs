use crate::common::command::{
    init_repository_dir, run_bit_command, run_git_command, staged_files, tracked_paths,
};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn rename_file_successfully(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let before = staged_files(init_repository_dir.path());

    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "one.txt"])
        .assert()
        .success()
        .stdout("");

    init_repository_dir
        .child("1.txt")
        .assert(predicates::path::missing());
    init_repository_dir.child("one.txt").assert("one");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["a/2.txt", "a/b/3.txt", "one.txt"]
    );

    // the entry keeps its object id and mode
    let moved = before
        .lines()
        .find_map(|line| line.strip_suffix("\t1.txt"))
        .ok_or("1.txt was not staged")?;
    assert!(
        staged_files(init_repository_dir.path())
            .lines()
            .any(|line| line == format!("{moved}\tone.txt"))
    );

    Ok(())
}

#[rstest]
fn rename_reports_every_move_when_verbose(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "-v", "1.txt", "one.txt"])
        .assert()
        .success()
        .stdout("Renaming 1.txt to one.txt\n");

    Ok(())
}

#[rstest]
fn moving_back_and_forth_restores_the_index(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let before = staged_files(init_repository_dir.path());

    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "z.txt"])
        .assert()
        .success();
    run_bit_command(init_repository_dir.path(), &["mv", "z.txt", "1.txt"])
        .assert()
        .success();

    assert_eq!(staged_files(init_repository_dir.path()), before);
    init_repository_dir.child("1.txt").assert("one");

    Ok(())
}

#[rstest]
fn index_written_by_mv_is_readable_by_git(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "a", "c"])
        .assert()
        .success();

    let output = run_git_command(init_repository_dir.path(), &["ls-files"]).output()?;

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "1.txt\nc/2.txt\nc/b/3.txt\n");

    Ok(())
}
