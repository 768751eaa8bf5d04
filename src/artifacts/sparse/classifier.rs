use crate::areas::index::Index;
use crate::artifacts::core::with_trailing_slash;
use crate::artifacts::sparse::SparsePredicate;
use std::path::Path;

/// Sparse-checkout questions asked while classifying moves
pub struct SparseClassifier<'p> {
    predicate: &'p dyn SparsePredicate,
}

impl<'p> SparseClassifier<'p> {
    pub fn new(predicate: &'p dyn SparsePredicate) -> Self {
        SparseClassifier { predicate }
    }

    pub fn is_active(&self) -> bool {
        self.predicate.is_active()
    }

    pub fn in_cone(&self, path: &Path) -> bool {
        self.predicate.in_cone(path)
    }

    pub fn dir_in_cone(&self, dir: &Path) -> bool {
        self.predicate.in_cone(&with_trailing_slash(dir))
    }

    /// A directory that only exists in the index: it has entries, all skip-worktree
    pub fn is_sparse_directory(&self, index: &Index, dir: &Path) -> anyhow::Result<bool> {
        let entries = index.entries_under(dir)?;

        Ok(!entries.is_empty() && entries.iter().all(|entry| entry.is_skip_worktree()))
    }

    /// An out-of-cone directory missing from disk that still has tracked content
    pub fn is_sparse_shadow(&self, index: &Index, dir: &Path) -> anyhow::Result<bool> {
        Ok(!self.dir_in_cone(dir) && self.is_sparse_directory(index, dir)?)
    }
}
