use crate::common::command::{init_repository_dir, run_bit_command, staged_files};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::{fixture, rstest};

const SUBMODULE_COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

/// `sub` checked out with a gitfile pointing at `.git/modules/sub`
#[fixture]
fn submodule_repository_dir(init_repository_dir: TempDir) -> TempDir {
    let root = init_repository_dir.path();

    write_file(FileSpec::new(
        root.join(".gitmodules"),
        "[submodule \"sub\"]\n\tpath = sub\n\turl = ./upstream\n".to_string(),
    ));
    write_file(FileSpec::new(
        root.join(".git/modules/sub/config"),
        "[core]\n\tbare = false\n\tworktree = ../../../sub\n".to_string(),
    ));
    write_file(FileSpec::new(
        root.join("sub/.git"),
        "gitdir: ../.git/modules/sub\n".to_string(),
    ));
    write_file(FileSpec::new(root.join("sub/lib.txt"), "lib".to_string()));

    run_bit_command(root, &["add", ".gitmodules"])
        .assert()
        .success();
    run_bit_command(
        root,
        &["update-index", "--cacheinfo", &format!("160000,{SUBMODULE_COMMIT},sub")],
    )
    .assert()
    .success();

    init_repository_dir
}

#[rstest]
fn move_submodule(submodule_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let root = submodule_repository_dir.path();

    run_bit_command(root, &["mv", "sub", "sub2"])
        .assert()
        .success();

    submodule_repository_dir.child("sub2/lib.txt").assert("lib");
    submodule_repository_dir
        .child("sub2/.git")
        .assert("gitdir: ../.git/modules/sub\n");
    submodule_repository_dir
        .child(".gitmodules")
        .assert("[submodule \"sub\"]\n\tpath = sub2\n\turl = ./upstream\n");
    submodule_repository_dir
        .child(".git/modules/sub/config")
        .assert(predicate::str::contains("worktree = ../../../sub2"));

    let staged = staged_files(root);
    assert!(staged.contains(&format!("160000 {SUBMODULE_COMMIT} 0\tsub2\n")));
    assert!(!staged.contains("\tsub\n"));

    // the rewritten .gitmodules is staged again
    let gitmodules_line = staged
        .lines()
        .find(|line| line.ends_with("\t.gitmodules"))
        .ok_or(".gitmodules is not staged")?;
    run_bit_command(root, &["add", ".gitmodules"])
        .assert()
        .success();
    assert!(staged_files(root).contains(gitmodules_line));

    Ok(())
}

#[rstest]
fn unstaged_gitmodules_changes_block_the_move(
    submodule_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    submodule_repository_dir
        .child(".gitmodules")
        .write_str("[submodule \"sub\"]\n\tpath = sub\n\turl = ./elsewhere\n")?;

    run_bit_command(submodule_repository_dir.path(), &["mv", "sub", "sub2"])
        .assert()
        .failure()
        .code(128)
        .stderr("fatal: Please stage your changes to .gitmodules or stash them to proceed\n");

    submodule_repository_dir
        .child("sub/lib.txt")
        .assert("lib");

    Ok(())
}

#[rstest]
fn directory_tracked_as_a_file_is_not_a_submodule(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = init_repository_dir.path();
    write_file(FileSpec::new(root.join("fake/inner.txt"), "inner".to_string()));
    run_bit_command(
        root,
        &["update-index", "--cacheinfo", &format!("100644,{SUBMODULE_COMMIT},fake")],
    )
    .assert()
    .success();

    run_bit_command(root, &["mv", "fake", "moved"])
        .assert()
        .failure()
        .code(128)
        .stderr("fatal: Directory fake is in index and no submodule?\n");

    Ok(())
}
