//! Sparse checkout
//!
//! With sparse checkout enabled only the paths inside the cone are present in
//! the working tree. Index entries outside of it carry the skip-worktree flag.
//!
//! - `cone`: parsing and matching of cone-mode patterns
//! - `classifier`: questions the relocation engine asks about paths and directories

pub mod classifier;
pub mod cone;

use crate::artifacts::config::config_file::ConfigFile;
use crate::artifacts::sparse::cone::ConePatterns;
use anyhow::Context;
use std::path::Path;

/// Anything that can tell whether a path belongs in the working tree
pub trait SparsePredicate {
    fn in_cone(&self, path: &Path) -> bool;

    /// Whether any path can be outside the cone at all
    fn is_active(&self) -> bool;
}

/// Sparse-checkout state of a repository
#[derive(Debug, Clone, Default)]
pub enum SparseCheckout {
    /// Every path is in the working tree
    #[default]
    Disabled,
    Cone(ConePatterns),
}

impl SparseCheckout {
    /// Active iff `core.sparseCheckout` is set and `info/sparse-checkout` exists
    pub fn load(git_dir: &Path, config: &ConfigFile) -> anyhow::Result<Self> {
        if !config
            .get_bool("core", None, "sparsecheckout")?
            .unwrap_or(false)
        {
            return Ok(SparseCheckout::Disabled);
        }

        let patterns_path = git_dir.join("info").join("sparse-checkout");
        let content = match std::fs::read_to_string(&patterns_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SparseCheckout::Disabled);
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Unable to read {}", patterns_path.display())
                });
            }
        };

        match ConePatterns::parse(&content) {
            Some(patterns) => Ok(SparseCheckout::Cone(patterns)),
            None => {
                tracing::warn!("sparse-checkout file holds non-cone patterns; treating every path as in cone");
                Ok(SparseCheckout::Disabled)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SparseCheckout::Cone(_))
    }
}

impl SparsePredicate for SparseCheckout {
    fn in_cone(&self, path: &Path) -> bool {
        match self {
            SparseCheckout::Disabled => true,
            SparseCheckout::Cone(patterns) => patterns.matches(path),
        }
    }

    fn is_active(&self) -> bool {
        self.is_enabled()
    }
}
