use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt`, `a/2.txt` and `a/b/3.txt` staged
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let file1 = FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string());
    write_file(file1);

    let file2 = FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    );
    write_file(file2);

    let file3 = FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    );
    write_file(file3);

    run_bit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    repository_dir
}

/// Repository tracking `in/a.txt`, `out/b.txt`, `out/deep/c.txt` and `root.txt`
fn staged_sparse_layout(dir: &Path) {
    run_bit_command(dir, &["init"]).assert().success();

    for (path, content) in [
        ("in/a.txt", "in a"),
        ("out/b.txt", "out b"),
        ("out/deep/c.txt", "out c"),
        ("root.txt", "root"),
    ] {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
    }

    run_bit_command(dir, &["add", "."]).assert().success();
}

/// Repository with `in/*` checked out and `out/*` only in the index
///
/// The sparse-checkout cone holds the root and `in/`, configured by hand in
/// `.git/config`.
#[fixture]
pub fn sparse_repository_dir(repository_dir: TempDir) -> TempDir {
    staged_sparse_layout(repository_dir.path());
    run_bit_command(
        repository_dir.path(),
        &["update-index", "--skip-worktree", "out/b.txt", "out/deep/c.txt"],
    )
    .assert()
    .success();

    std::fs::remove_dir_all(repository_dir.path().join("out")).expect("Failed to remove out/");
    std::fs::write(
        repository_dir.path().join(".git/info/sparse-checkout"),
        "/*\n!/*/\n/in/\n",
    )
    .expect("Failed to write sparse-checkout patterns");
    std::fs::write(
        repository_dir.path().join(".git/config"),
        "[core]\n\trepositoryformatversion = 0\n\tbare = false\n\tsparseCheckout = true\n\tsparseCheckoutCone = true\n",
    )
    .expect("Failed to write config");

    repository_dir
}

/// Same layout as `sparse_repository_dir`, with the cone set up by
/// `git sparse-checkout`, which keeps its settings in `.git/config.worktree`
#[fixture]
pub fn git_sparse_repository_dir(repository_dir: TempDir) -> TempDir {
    staged_sparse_layout(repository_dir.path());
    run_git_command(repository_dir.path(), &["sparse-checkout", "set", "--cone", "in"])
        .assert()
        .success();

    repository_dir
}

pub fn run_bit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitmv").expect("Failed to find bitmv binary");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// `ls-files --stage` output of the repository at `dir`
pub fn staged_files(dir: &Path) -> String {
    let output = run_bit_command(dir, &["ls-files", "--stage"])
        .output()
        .expect("Failed to run ls-files");

    String::from_utf8(output.stdout).expect("ls-files printed invalid UTF-8")
}

/// Tracked paths of the repository at `dir`, in index order
pub fn tracked_paths(dir: &Path) -> Vec<String> {
    let output = run_bit_command(dir, &["ls-files"])
        .output()
        .expect("Failed to run ls-files");

    String::from_utf8(output.stdout)
        .expect("ls-files printed invalid UTF-8")
        .lines()
        .map(str::to_string)
        .collect()
}
