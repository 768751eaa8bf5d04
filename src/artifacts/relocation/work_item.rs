use crate::artifacts::submodule::SubmoduleLink;
use derive_new::new;
use std::path::PathBuf;

/// What applying a work item touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Rename on disk and rewrite the index entry
    #[default]
    Both,
    /// Directory placeholder: rename on disk only, its entries move separately
    WorkingDirectory,
    /// Entry expanded from a directory: index only
    Index,
    /// Skip-worktree entry: index only, materialized if it lands in the cone
    Sparse,
    /// Out-of-cone directory placeholder: nothing to rename anywhere
    SkipWorktreeDirectory,
}

impl UpdateMode {
    pub fn renames_on_disk(&self) -> bool {
        matches!(self, UpdateMode::Both | UpdateMode::WorkingDirectory)
    }

    pub fn rewrites_index(&self) -> bool {
        matches!(
            self,
            UpdateMode::Both | UpdateMode::Index | UpdateMode::Sparse
        )
    }
}

/// One pending `source -> destination` relocation, both relative to the root
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct WorkItem {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[new(default)]
    pub mode: UpdateMode,
    #[new(default)]
    pub submodule: SubmoduleLink,
}

impl WorkItem {
    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }
}
