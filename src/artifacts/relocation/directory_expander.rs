use crate::areas::index::Index;
use crate::artifacts::core::with_trailing_slash;
use crate::artifacts::relocation::rejection::MoveError;
use crate::artifacts::relocation::work_item::{UpdateMode, WorkItem};
use std::collections::BTreeSet;
use std::path::Path;

/// Expands a directory move into one move per tracked entry below it
pub struct DirectoryExpander<'r> {
    index: &'r Index,
}

impl<'r> DirectoryExpander<'r> {
    pub fn new(index: &'r Index) -> Self {
        DirectoryExpander { index }
    }

    /// `source/<rest>` becomes `destination/<rest>` for every entry under `source/`
    ///
    /// Entries outside the working tree (skip-worktree) are moved in sparse mode,
    /// the others in the index only since the directory itself is renamed on
    /// disk. An empty result means nothing below `source` is tracked.
    pub fn expand(&self, source: &Path, destination: &Path) -> anyhow::Result<Vec<WorkItem>> {
        if self.index.has_entry_with_trailing_slash(source)? {
            return Err(MoveError::DirectoryInIndex(with_trailing_slash(source)).into());
        }

        let mut seen = BTreeSet::new();
        let mut items = Vec::new();

        for entry in self.index.entries_under(source)? {
            if !seen.insert(entry.name.as_path()) {
                continue;
            }

            let rest = entry.name.strip_prefix(source)?;
            let mode = match entry.is_skip_worktree() {
                true => UpdateMode::Sparse,
                false => UpdateMode::Index,
            };

            items.push(WorkItem::new(entry.name.clone(), destination.join(rest)).with_mode(mode));
        }

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            entries = items.len(),
            "expanded directory"
        );
        Ok(items)
    }
}
