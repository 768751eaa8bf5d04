use crate::common::command::{init_repository_dir, run_bit_command, tracked_paths};
use crate::common::file::{create_directory, write_generated_files};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn move_multiple_sources_into_directory(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    create_directory(&init_repository_dir.path().join("dst"));

    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "a/2.txt", "dst"])
        .assert()
        .success();

    init_repository_dir.child("dst/1.txt").assert("one");
    init_repository_dir.child("dst/2.txt").assert("two");
    assert_eq!(
        tracked_paths(init_repository_dir.path()),
        vec!["a/b/3.txt", "dst/1.txt", "dst/2.txt"]
    );

    Ok(())
}

#[rstest]
fn move_generated_files_into_directory(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let generated = write_generated_files(&init_repository_dir.path().join("gen"), 4);
    run_bit_command(init_repository_dir.path(), &["add", "gen"])
        .assert()
        .success();
    create_directory(&init_repository_dir.path().join("dst"));

    let mut args = vec!["mv".to_string()];
    args.extend(
        generated
            .iter()
            .map(|file| format!("gen/{}", file.path.file_name().unwrap().to_string_lossy())),
    );
    args.push("dst/".to_string());
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();

    run_bit_command(init_repository_dir.path(), &args)
        .assert()
        .success();

    for file in &generated {
        let name = file.path.file_name().unwrap();
        init_repository_dir
            .child("dst")
            .child(name)
            .assert(file.content.as_str());
    }
    assert!(
        tracked_paths(init_repository_dir.path())
            .iter()
            .all(|path| !path.starts_with("gen/"))
    );

    Ok(())
}

#[rstest]
fn several_sources_need_a_directory_destination(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "a/2.txt", "nowhere"])
        .assert()
        .failure()
        .code(128)
        .stderr("fatal: destination 'nowhere' is not a directory\n");

    Ok(())
}

#[rstest]
fn two_sources_for_one_destination_are_refused(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    init_repository_dir.child("x/1.txt").write_str("other one")?;
    run_bit_command(init_repository_dir.path(), &["add", "x"])
        .assert()
        .success();
    create_directory(&init_repository_dir.path().join("dst"));

    run_bit_command(init_repository_dir.path(), &["mv", "1.txt", "x/1.txt", "dst"])
        .assert()
        .failure()
        .code(128)
        .stderr(
            "fatal: multiple sources for the same target, source=x/1.txt, destination=dst/1.txt\n",
        );

    // nothing moved
    init_repository_dir.child("1.txt").assert("one");
    init_repository_dir.child("dst/1.txt").assert(predicates::path::missing());

    Ok(())
}
