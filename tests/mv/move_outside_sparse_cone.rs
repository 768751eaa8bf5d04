use crate::common::command::{
    git_sparse_repository_dir, repository_dir, run_bit_command, sparse_repository_dir,
    staged_files,
};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn tagged_files(dir: &std::path::Path) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_bit_command(dir, &["ls-files", "-t"]).output()?;
    Ok(String::from_utf8(output.stdout)?)
}

#[rstest]
#[case(&["mv", "out/b.txt", "in/b.txt"], "out/b.txt\n")]
#[case(&["mv", "root.txt", "out/root.txt"], "out/root.txt\n")]
#[case(&["mv", "in/a.txt", "out/a.txt"], "out/a.txt\n")]
fn out_of_cone_paths_need_the_sparse_flag(
    #[values(
        sparse_repository_dir(repository_dir()),
        git_sparse_repository_dir(repository_dir())
    )]
    repository: TempDir,
    #[case] args: &[&str],
    #[case] advised: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let before = staged_files(repository.path());

    run_bit_command(repository.path(), args)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with(format!(
            "The following paths and/or pathspecs matched paths that exist\n\
            outside of your sparse-checkout definition, so will not be\n\
            updated in the index:\n{advised}"
        )))
        .stderr(predicate::str::contains("* Use the --sparse option."));

    assert_eq!(staged_files(repository.path()), before);

    Ok(())
}

#[rstest]
fn sparse_entry_moved_into_the_cone_is_checked_out(
    #[values(
        sparse_repository_dir(repository_dir()),
        git_sparse_repository_dir(repository_dir())
    )]
    repository: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(
        repository.path(),
        &["mv", "--sparse", "out/b.txt", "in/b.txt"],
    )
    .assert()
    .success();

    repository.child("in/b.txt").assert("out b");
    assert_eq!(
        tagged_files(repository.path())?,
        "H in/a.txt\nH in/b.txt\nS out/deep/c.txt\nH root.txt\n"
    );

    Ok(())
}

#[rstest]
fn sparse_entry_moved_outside_the_cone_stays_sparse(
    sparse_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(
        sparse_repository_dir.path(),
        &["mv", "--sparse", "out/b.txt", "out/deep/b.txt"],
    )
    .assert()
    .success();

    sparse_repository_dir
        .child("out")
        .assert(predicate::path::missing());
    assert_eq!(
        tagged_files(sparse_repository_dir.path())?,
        "H in/a.txt\nS out/deep/b.txt\nS out/deep/c.txt\nH root.txt\n"
    );

    Ok(())
}

#[rstest]
fn directory_missing_from_disk_is_moved_entry_by_entry(
    sparse_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(sparse_repository_dir.path(), &["mv", "--sparse", "out", "in/out"])
        .assert()
        .success();

    sparse_repository_dir.child("in/out/b.txt").assert("out b");
    sparse_repository_dir.child("in/out/deep/c.txt").assert("out c");
    assert_eq!(
        tagged_files(sparse_repository_dir.path())?,
        "H in/a.txt\nH in/out/b.txt\nH in/out/deep/c.txt\nH root.txt\n"
    );

    Ok(())
}

#[rstest]
fn keep_going_moves_what_is_inside_the_cone(
    sparse_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    sparse_repository_dir.child("in/dst").create_dir_all()?;

    run_bit_command(
        sparse_repository_dir.path(),
        &["mv", "-k", "out/b.txt", "in/a.txt", "in/dst"],
    )
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("out/b.txt\n"));

    sparse_repository_dir.child("in/dst/a.txt").assert("in a");
    assert_eq!(
        tagged_files(sparse_repository_dir.path())?,
        "H in/dst/a.txt\nS out/b.txt\nS out/deep/c.txt\nH root.txt\n"
    );

    Ok(())
}

#[rstest]
fn sparse_flag_is_harmless_without_sparse_checkout(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("a.txt").write_str("a")?;
    run_bit_command(repository_dir.path(), &["add", "a.txt"])
        .assert()
        .success();

    run_bit_command(repository_dir.path(), &["mv", "--sparse", "a.txt", "b.txt"])
        .assert()
        .success();

    repository_dir.child("b.txt").assert("a");

    Ok(())
}

#[rstest]
fn sparse_checkout_written_by_git_is_honoured(
    git_sparse_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    git_sparse_repository_dir
        .child(".git/config.worktree")
        .assert(predicate::str::contains("sparseCheckout = true"));
    git_sparse_repository_dir
        .child("out")
        .assert(predicate::path::missing());

    run_bit_command(git_sparse_repository_dir.path(), &["mv", "root.txt", "out/root.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("out/root.txt\n"));

    git_sparse_repository_dir.child("root.txt").assert("root");

    Ok(())
}
