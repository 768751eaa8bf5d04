use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::relocation::MoveOptions;
use crate::artifacts::relocation::rejection::MoveError;
use crate::artifacts::relocation::work_item::{UpdateMode, WorkItem};
use crate::artifacts::sparse::SparsePredicate;
use crate::artifacts::submodule::SubmoduleLink;
use crate::artifacts::submodule::gitfile::Gitfile;
use crate::artifacts::submodule::gitmodules::{GITMODULES_FILE, Gitmodules, PathUpdate};
use anyhow::{Context, anyhow};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

/// What applying a work list did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub moved: usize,
    /// Renames that failed and were skipped under `-k`
    pub skipped: usize,
    pub gitmodules_modified: bool,
}

/// Applies classified work items to the working tree and the index
///
/// The index is only modified in memory; writing it is left to the caller,
/// who holds the lock.
pub struct MoveExecutor<'r> {
    repository: &'r Repository,
    index: &'r mut Index,
    sparse: &'r dyn SparsePredicate,
    options: MoveOptions,
}

impl<'r> MoveExecutor<'r> {
    pub fn new(
        repository: &'r Repository,
        index: &'r mut Index,
        sparse: &'r dyn SparsePredicate,
        options: MoveOptions,
    ) -> Self {
        MoveExecutor {
            repository,
            index,
            sparse,
            options,
        }
    }

    pub fn apply(mut self, items: Vec<WorkItem>) -> anyhow::Result<ExecutionReport> {
        let mut report = ExecutionReport::default();

        for item in items {
            if self.options.verbose || self.options.dry_run {
                writeln!(
                    self.repository.writer(),
                    "Renaming {} to {}",
                    item.source.display(),
                    item.destination.display()
                )?;
            }
            if self.options.dry_run {
                continue;
            }

            if item.mode.renames_on_disk()
                && let Err(err) = self
                    .repository
                    .workspace()
                    .rename(&item.source, &item.destination)
            {
                if !self.options.ignore_errors {
                    return Err(err).context(MoveError::RenameFailed(item.source.clone()));
                }

                eprintln!(
                    "{} renaming '{}' failed: {err}",
                    "warning:".yellow(),
                    item.source.display()
                );
                report.skipped += 1;
                continue;
            }

            if item.submodule.is_submodule() {
                report.gitmodules_modified |= self.relocate_submodule(&item)?;
            }

            if item.mode.rewrites_index() {
                self.index.rename_entry(&item.source, &item.destination)?;

                match item.mode {
                    UpdateMode::Sparse => self.materialize(&item.destination)?,
                    _ => self.refresh_stat(&item.destination)?,
                }
            }

            report.moved += 1;
        }

        if report.gitmodules_modified {
            self.stage_gitmodules()?;
        }

        tracing::info!(moved = report.moved, skipped = report.skipped, "applied moves");
        Ok(report)
    }

    /// Returns whether `.gitmodules` was rewritten
    fn relocate_submodule(&self, item: &WorkItem) -> anyhow::Result<bool> {
        if self
            .index
            .any_stage_entry(Path::new(GITMODULES_FILE))
            .is_some_and(IndexEntry::is_conflicted)
        {
            return Err(MoveError::GitmodulesUnmerged.into());
        }

        let workspace = self.repository.workspace();
        let modified = match Gitmodules::open(workspace.path())?
            .update_path(&item.source, &item.destination)?
        {
            PathUpdate::Updated => true,
            PathUpdate::NoGitmodules => false,
            PathUpdate::NoSection => {
                eprintln!(
                    "{} Could not find section in .gitmodules where path={}",
                    "warning:".yellow(),
                    item.source.display()
                );
                false
            }
        };

        if let SubmoduleLink::Gitfile(gitdir) = &item.submodule {
            Gitfile::relink(&workspace.absolute(&item.destination), gitdir)?;
        }

        Ok(modified)
    }

    /// Keep the stat data of a renamed entry in sync when its content is unchanged
    fn refresh_stat(&mut self, path: &Path) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();
        let Some(entry) = self.index.entry_by_path(path) else {
            return Ok(());
        };
        if entry.mode().is_gitlink() || !workspace.exists(path) {
            return Ok(());
        }

        let stat = workspace.stat_file(path)?;
        if !entry.stat_match(&stat) {
            return Ok(());
        }
        if workspace.parse_blob(path)?.object_id()? != entry.oid {
            return Ok(());
        }

        self.index.update_entry_stat(path, stat);
        Ok(())
    }

    /// Check out a sparse entry that was moved into the cone
    fn materialize(&mut self, path: &Path) -> anyhow::Result<()> {
        if !(self.options.sparse && self.sparse.is_active() && self.sparse.in_cone(path)) {
            return Ok(());
        }

        let workspace = self.repository.workspace();
        let entry = self
            .index
            .entry_by_path_mut(path)
            .ok_or_else(|| anyhow!("'{}' is not in the index", path.display()))?;
        entry.set_skip_worktree(false);
        let entry = entry.clone();

        if workspace.lstat(path).is_some() && !self.options.force {
            if workspace.parse_blob(path)?.object_id()? != entry.oid {
                return Err(anyhow!("'{}' already exists, no checkout", path.display()))
                    .context(MoveError::CheckoutFailed(path.to_path_buf()));
            }

            return self.refresh_stat(path);
        }

        let blob = self
            .repository
            .database()
            .parse_object_as_blob(&entry.oid)?
            .ok_or_else(|| anyhow!("object {} is not a blob", entry.oid))
            .context(MoveError::CheckoutFailed(path.to_path_buf()))?;
        let stat = workspace
            .checkout_entry(&entry, blob.content())
            .context(MoveError::CheckoutFailed(path.to_path_buf()))?;

        self.index.update_entry_stat(path, stat);
        tracing::debug!(path = %path.display(), "checked out sparse entry");
        Ok(())
    }

    fn stage_gitmodules(&mut self) -> anyhow::Result<()> {
        let path = Path::new(GITMODULES_FILE);
        let workspace = self.repository.workspace();

        let blob = workspace.parse_blob(path)?;
        let oid = self.repository.database().store(blob)?;
        let stat = workspace.stat_file(path)?;

        self.index
            .add(IndexEntry::new(path.to_path_buf(), oid, stat))
            .context("could not stage .gitmodules")
    }
}
