//! Cone-mode sparse-checkout patterns
//!
//! A cone is described by two sets of directories:
//!
//! - recursive directories, whose whole subtree is checked out (`/A/B/`)
//! - parent directories, of which only the immediate files are checked out
//!   (`/A/` followed by `!/A/*/`)
//!
//! Files at the repository root are always part of the cone.

use crate::artifacts::core::has_trailing_slash;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConePatterns {
    recursive: BTreeSet<PathBuf>,
    parents: BTreeSet<PathBuf>,
}

impl ConePatterns {
    /// Parse the content of `.git/info/sparse-checkout`
    ///
    /// Returns `None` as soon as one line is not a cone pattern.
    pub fn parse(content: &str) -> Option<Self> {
        let mut patterns = ConePatterns::default();

        for line in content.lines().map(str::trim_end) {
            if line.is_empty() || line.starts_with('#') || line == "/*" || line == "!/*/" {
                continue;
            }

            if let Some(dir) = line
                .strip_prefix("!/")
                .and_then(|line| line.strip_suffix("/*/"))
            {
                let dir = Self::cone_dir(dir)?;
                patterns.recursive.remove(&dir);
                patterns.parents.insert(dir);
            } else if let Some(dir) = line
                .strip_prefix('/')
                .and_then(|line| line.strip_suffix('/'))
            {
                let dir = Self::cone_dir(dir)?;
                if !patterns.parents.contains(&dir) {
                    patterns.recursive.insert(dir);
                }
            } else {
                return None;
            }
        }

        Some(patterns)
    }

    fn cone_dir(dir: &str) -> Option<PathBuf> {
        match dir.is_empty() || dir.contains(['*', '?', '[', '\\']) {
            true => None,
            false => Some(PathBuf::from(dir)),
        }
    }

    pub fn add_recursive(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        let parents = dir
            .ancestors()
            .skip(1)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .collect::<Vec<_>>();

        self.parents.extend(parents);
        self.recursive.insert(dir);
    }

    /// Whether `path` lies inside the cone; a trailing `/` asks about a directory
    pub fn matches(&self, path: &Path) -> bool {
        let dir = match has_trailing_slash(path) {
            true => path,
            false => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => return true,
            },
        };
        let dir = dir.components().collect::<PathBuf>();

        if self.parents.contains(&dir) {
            return true;
        }

        dir.ancestors()
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .any(|ancestor| self.recursive.contains(ancestor))
    }
}
