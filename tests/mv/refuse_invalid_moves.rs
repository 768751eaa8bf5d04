use crate::common::command::{init_repository_dir, run_bit_command, staged_files};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(&["mv", "untracked.txt", "x.txt"], "not under version control, source=untracked.txt, destination=x.txt")]
#[case(&["mv", "missing.txt", "x.txt"], "bad source, source=missing.txt, destination=x.txt")]
#[case(&["mv", "a", "a/b"], "can not move directory into itself, source=a, destination=a/b/a")]
#[case(&["mv", "a", "1.txt"], "cannot move directory over file, source=a, destination=1.txt")]
#[case(&["mv", "empty", "full"], "source directory is empty, source=empty, destination=full")]
#[case(&["mv", "1.txt", "missing/"], "destination directory does not exist, source=1.txt, destination=missing/")]
#[case(&["mv", "1.txt", "../outside.txt"], "'../outside.txt' is outside repository")]
fn refuse_invalid_moves(
    init_repository_dir: TempDir,
    #[case] args: &[&str],
    #[case] message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    init_repository_dir.child("untracked.txt").write_str("new")?;
    init_repository_dir.child("empty").create_dir_all()?;
    let before = staged_files(init_repository_dir.path());

    run_bit_command(init_repository_dir.path(), args)
        .assert()
        .failure()
        .code(128)
        .stdout("")
        .stderr(format!("fatal: {message}\n"));

    assert_eq!(staged_files(init_repository_dir.path()), before);
    init_repository_dir
        .child(".git/index.lock")
        .assert(predicates::path::missing());

    Ok(())
}

#[rstest]
fn conflicted_file_is_refused(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let staged = staged_files(init_repository_dir.path());
    let (mode_and_oid, _) = staged
        .lines()
        .find_map(|line| line.strip_suffix("\t1.txt"))
        .and_then(|prefix| prefix.rsplit_once(' '))
        .ok_or("1.txt was not staged")?;

    run_bit_command(init_repository_dir.path(), &["update-index", "--index-info"])
        .write_stdin(format!(
            "{mode_and_oid} 1\t1.txt\n{mode_and_oid} 2\t1.txt\n{mode_and_oid} 3\t1.txt\n"
        ))
        .assert()
        .success();

    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "x.txt"])
        .assert()
        .failure()
        .code(128)
        .stderr("fatal: conflicted, source=1.txt, destination=x.txt\n");

    init_repository_dir.child("1.txt").assert("one");

    Ok(())
}

#[rstest]
fn missing_arguments_are_rejected_by_the_parser(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "1.txt"])
        .assert()
        .failure()
        .code(2);

    Ok(())
}

#[rstest]
fn running_outside_a_repository_fails() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;

    run_bit_command(dir.path(), &["mv", "a.txt", "b.txt"])
        .assert()
        .failure()
        .code(128)
        .stderr(predicates::str::contains("not a git repository"));

    Ok(())
}
