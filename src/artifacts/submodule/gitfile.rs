//! `.git` files linking a submodule's working tree to its git directory
//!
//! A submodule checked out by a superproject usually has a `.git` *file*
//! containing `gitdir: <path>`, pointing into the superproject's
//! `.git/modules/`. The git directory points back through `core.worktree`.
//! Both links are relative so the pair survives moving the superproject.

use crate::artifacts::config::config_file::ConfigFile;
use crate::artifacts::core::{normalize, relative_path};
use anyhow::{Context, anyhow};
use std::path::{Path, PathBuf};

const GITFILE_PREFIX: &str = "gitdir:";

pub struct Gitfile;

impl Gitfile {
    /// Git directory named by `<work_tree>/.git`
    ///
    /// `None` when `.git` is missing or is not a regular file (an embedded git
    /// directory, for instance). A file without a valid `gitdir:` line or one
    /// pointing nowhere is an error.
    pub fn read(work_tree: &Path) -> anyhow::Result<Option<PathBuf>> {
        let gitfile = work_tree.join(".git");

        match std::fs::symlink_metadata(&gitfile) {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Ok(None),
        }

        let content = std::fs::read_to_string(&gitfile)
            .with_context(|| format!("error reading {}", gitfile.display()))?;
        let gitdir = content
            .lines()
            .next()
            .and_then(|line| line.strip_prefix(GITFILE_PREFIX))
            .map(str::trim)
            .filter(|gitdir| !gitdir.is_empty())
            .ok_or_else(|| anyhow!("invalid gitfile format: {}", gitfile.display()))?;

        let gitdir = work_tree.join(gitdir);
        let gitdir = normalize(&gitdir).unwrap_or(gitdir);

        if !gitdir.is_dir() {
            return Err(anyhow!("not a git repository: {}", gitdir.display()));
        }

        Ok(Some(gitdir))
    }

    /// Point `<work_tree>/.git` at `gitdir` and `gitdir` back at `work_tree`
    pub fn relink(work_tree: &Path, gitdir: &Path) -> anyhow::Result<()> {
        let work_tree = work_tree
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", work_tree.display()))?;
        let gitdir = gitdir
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", gitdir.display()))?;

        let gitfile = work_tree.join(".git");
        std::fs::write(
            &gitfile,
            format!(
                "{GITFILE_PREFIX} {}\n",
                relative_path(&work_tree, &gitdir).display()
            ),
        )
        .with_context(|| format!("could not write {}", gitfile.display()))?;

        let mut config = ConfigFile::open(&gitdir.join("config"))?;
        config.set(
            "core",
            None,
            "worktree",
            &relative_path(&gitdir, &work_tree).to_string_lossy(),
        );
        config.save()?;

        tracing::debug!(work_tree = %work_tree.display(), gitdir = %gitdir.display(), "relinked submodule");
        Ok(())
    }
}
