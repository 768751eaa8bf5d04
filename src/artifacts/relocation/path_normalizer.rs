//! From command-line arguments to `(source, destination)` pairs
//!
//! Arguments are relative to the directory the command runs in. They are
//! rebased on the repository root and resolved lexically, then the destination
//! of every source is derived:
//!
//! - a destination naming the root or an existing directory receives each
//!   source under its basename
//! - otherwise there must be exactly one source, moved to the destination as is
//!
//! The destination keeps a trailing slash so that `mv a.txt missing/` can be
//! refused later on, unless a single directory is renamed to a new name.

use crate::areas::workspace::Workspace;
use crate::artifacts::core::{has_trailing_slash, normalize, strip_trailing_slashes};
use crate::artifacts::relocation::rejection::MoveError;
use crate::artifacts::relocation::work_item::WorkItem;
use anyhow::anyhow;
use std::path::{Path, PathBuf};

pub struct PathNormalizer<'r> {
    workspace: &'r Workspace,
    /// Invocation directory relative to the root
    prefix: &'r Path,
}

impl<'r> PathNormalizer<'r> {
    pub fn new(workspace: &'r Workspace, prefix: &'r Path) -> Self {
        PathNormalizer { workspace, prefix }
    }

    /// Turn `<source>... <destination>` into work items
    pub fn normalize(&self, arguments: &[String]) -> anyhow::Result<Vec<WorkItem>> {
        let Some((destination, sources)) = arguments.split_last() else {
            return Err(anyhow!("missing source and destination"));
        };
        if sources.is_empty() {
            return Err(anyhow!("missing destination for '{destination}'"));
        }

        let source_paths = sources
            .iter()
            .map(|source| self.prefix_path(source, false))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let keep_trailing_slash = !(source_paths.len() == 1
            && self.workspace.is_dir(&source_paths[0])
            && !self.workspace.is_dir(&self.prefix_path(destination, false)?));
        let destination_path = self.prefix_path(destination, keep_trailing_slash)?;

        let destinations = if destination_path.as_os_str().is_empty() {
            Self::under_basenames(&destination_path, sources)?
        } else if self
            .workspace
            .lstat(&destination_path)
            .is_some_and(|metadata| metadata.is_dir())
        {
            Self::under_basenames(&strip_trailing_slashes(&destination_path), sources)?
        } else if sources.len() != 1 {
            return Err(MoveError::NotADirectory(destination_path).into());
        } else {
            vec![destination_path]
        };

        Ok(source_paths
            .into_iter()
            .zip(destinations)
            .map(|(source, destination)| WorkItem::new(source, destination))
            .collect())
    }

    /// Rebase an argument on the root and resolve it lexically
    fn prefix_path(&self, argument: &str, keep_trailing_slash: bool) -> anyhow::Result<PathBuf> {
        let raw = Path::new(argument);
        let joined = match raw.is_absolute() {
            true => raw
                .strip_prefix(self.workspace.path())
                .map_err(|_| MoveError::OutsideRepository(argument.to_string()))?
                .to_path_buf(),
            false => self.prefix.join(raw),
        };

        let mut normalized = normalize(&joined)
            .ok_or_else(|| MoveError::OutsideRepository(argument.to_string()))?;

        if keep_trailing_slash && has_trailing_slash(raw) && !normalized.as_os_str().is_empty() {
            normalized.push("");
        }

        Ok(normalized)
    }

    /// `<dir>/<basename of source>` for every source
    fn under_basenames(dir: &Path, sources: &[String]) -> anyhow::Result<Vec<PathBuf>> {
        sources
            .iter()
            .map(|source| -> anyhow::Result<PathBuf> {
                let source = strip_trailing_slashes(Path::new(source));
                let basename = source
                    .file_name()
                    .ok_or_else(|| MoveError::OutsideRepository(source.display().to_string()))?;
                Ok(dir.join(basename))
            })
            .collect()
    }
}
