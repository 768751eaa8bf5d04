//! Per-item checks deciding whether a move may proceed
//!
//! Items are examined in list order. Each check below refuses the item with
//! the first reason that applies:
//!
//! 1. the source is missing from the working tree (only skip-worktree entries,
//!    or directories holding nothing but those, may be moved then)
//! 2. the destination is the source or lies inside it
//! 3. a directory would replace an existing path
//! 4. a directory: submodules move as a whole, anything else is expanded
//! 5. a file: it must be tracked, merged, and not replace anything unless forced
//! 6. the destination was already claimed by an earlier item
//! 7. the destination names a directory that does not exist
//! 8. the source or destination lies outside the sparse-checkout cone
//!
//! The cone check comes last on purpose: a path only refused because of it can
//! be moved by repeating the command with `--sparse`.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::core::has_trailing_slash;
use crate::artifacts::relocation::MoveOptions;
use crate::artifacts::relocation::directory_expander::DirectoryExpander;
use crate::artifacts::relocation::rejection::{RejectReason, RejectionLedger};
use crate::artifacts::relocation::submodule_preparer::SubmodulePreparer;
use crate::artifacts::relocation::work_item::{UpdateMode, WorkItem};
use crate::artifacts::relocation::work_list::WorkList;
use crate::artifacts::sparse::SparsePredicate;
use crate::artifacts::sparse::classifier::SparseClassifier;
use crate::artifacts::submodule::SubmoduleLink;
use anyhow::anyhow;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of examining a single item
#[derive(Debug)]
enum Verdict {
    Accept {
        mode: UpdateMode,
        submodule: SubmoduleLink,
    },
    /// Directory placeholder followed by one item per contained entry
    Expand {
        mode: UpdateMode,
        items: Vec<WorkItem>,
    },
    Reject(RejectReason),
    /// Outside the sparse-checkout cone and `--sparse` was not given
    Exclude(Vec<PathBuf>),
}

impl Verdict {
    fn accept(mode: UpdateMode) -> Self {
        Verdict::Accept {
            mode,
            submodule: SubmoduleLink::None,
        }
    }
}

/// Surviving work items and everything that was refused on the way
#[derive(Debug)]
pub struct Classification {
    pub work_list: WorkList,
    pub ledger: RejectionLedger,
}

pub struct MoveClassifier<'r> {
    repository: &'r Repository,
    index: &'r Index,
    sparse: SparseClassifier<'r>,
    options: MoveOptions,
    /// `core.ignorecase`: a case-only rename does not collide with itself
    ignore_case: bool,
    /// Destinations claimed by accepted items
    claimed: BTreeSet<PathBuf>,
    ledger: RejectionLedger,
}

impl<'r> MoveClassifier<'r> {
    pub fn new(
        repository: &'r Repository,
        index: &'r Index,
        sparse: &'r dyn SparsePredicate,
        options: MoveOptions,
        ignore_case: bool,
    ) -> Self {
        MoveClassifier {
            repository,
            index,
            sparse: SparseClassifier::new(sparse),
            options,
            ignore_case,
            claimed: BTreeSet::new(),
            ledger: RejectionLedger::default(),
        }
    }

    /// Examine every item, expanding directories and dropping refused items
    ///
    /// A structural rejection aborts with an error unless errors are ignored.
    /// Sparse advisories never abort here; the caller decides what to do with
    /// them once the whole list is known.
    pub fn classify(mut self, items: Vec<WorkItem>) -> anyhow::Result<Classification> {
        let mut work_list = WorkList::new(items);

        while let Some(position) = work_list.next_position() {
            let item = work_list
                .get(position)
                .cloned()
                .ok_or_else(|| anyhow!("work item {position} vanished"))?;

            if self.options.dry_run {
                writeln!(
                    self.repository.writer(),
                    "Checking rename of '{}' to '{}'",
                    item.source.display(),
                    item.destination.display()
                )?;
            }

            let verdict = self.examine(&item)?;
            tracing::debug!(source = %item.source.display(), destination = %item.destination.display(), ?verdict, "classified");

            match verdict {
                Verdict::Accept { mode, submodule } => {
                    if let Some(accepted) = work_list.get_mut(position) {
                        accepted.mode = mode;
                        accepted.submodule = submodule;
                    }
                    self.claimed.insert(item.destination);
                }
                Verdict::Expand { mode, items } => {
                    if let Some(placeholder) = work_list.get_mut(position) {
                        placeholder.mode = mode;
                    }
                    self.claimed.insert(item.destination);
                    work_list.extend(items);
                }
                Verdict::Reject(reason) => {
                    let rejection = self.ledger.reject(&item.source, &item.destination, reason);
                    if !self.options.ignore_errors {
                        return Err(rejection.into_error().into());
                    }

                    tracing::info!(source = %item.source.display(), %reason, "skipping refused move");
                    work_list.remove(position);
                }
                Verdict::Exclude(paths) => {
                    paths
                        .iter()
                        .for_each(|path| self.ledger.advise_sparse(path));
                    work_list.remove(position);
                }
            }
        }

        Ok(Classification {
            work_list,
            ledger: self.ledger,
        })
    }

    fn examine(&self, item: &WorkItem) -> anyhow::Result<Verdict> {
        let workspace = self.repository.workspace();
        let source = item.source.as_path();
        let destination = item.destination.as_path();

        let Some(stat) = workspace.lstat(source) else {
            return self.examine_missing(item);
        };

        if destination.starts_with(source) {
            return Ok(Verdict::Reject(RejectReason::MoveIntoItself));
        }

        if stat.is_dir() {
            if workspace.exists(destination) {
                return Ok(Verdict::Reject(RejectReason::DirectoryOverFile));
            }
            return self.examine_directory(item, UpdateMode::WorkingDirectory);
        }

        self.examine_file(item)
    }

    /// The source is not in the working tree
    fn examine_missing(&self, item: &WorkItem) -> anyhow::Result<Verdict> {
        let source = item.source.as_path();

        let Some(entry) = self.index.entry_by_path(source) else {
            if self.sparse.is_sparse_shadow(self.index, source)? {
                return self.examine_directory(item, UpdateMode::SkipWorktreeDirectory);
            }

            return Ok(match item.mode {
                UpdateMode::Sparse => self.claim(item, Verdict::accept(UpdateMode::Sparse)),
                _ => Verdict::Reject(RejectReason::BadSource),
            });
        };

        if !entry.is_skip_worktree() {
            return Ok(Verdict::Reject(RejectReason::BadSource));
        }

        if !self.options.sparse {
            return Ok(Verdict::Exclude(vec![item.source.clone()]));
        }

        if self.index.entry_by_path(&item.destination).is_some() && !self.options.force {
            return Ok(Verdict::Reject(RejectReason::DestinationExists));
        }

        Ok(self.claim(item, Verdict::accept(UpdateMode::Sparse)))
    }

    fn examine_directory(&self, item: &WorkItem, mode: UpdateMode) -> anyhow::Result<Verdict> {
        if self.index.entry_by_path(&item.source).is_some() {
            let submodule = SubmodulePreparer::new(self.repository, self.index).prepare(&item.source)?;

            return Ok(self.claim(
                item,
                Verdict::Accept {
                    mode: UpdateMode::Both,
                    submodule,
                },
            ));
        }

        let items = DirectoryExpander::new(self.index).expand(&item.source, &item.destination)?;
        if items.is_empty() {
            return Ok(Verdict::Reject(RejectReason::SourceDirectoryEmpty));
        }

        Ok(self.claim(item, Verdict::Expand { mode, items }))
    }

    fn examine_file(&self, item: &WorkItem) -> anyhow::Result<Verdict> {
        let source = item.source.as_path();
        let destination = item.destination.as_path();

        let Some(entry) = self.index.any_stage_entry(source) else {
            return Ok(Verdict::Reject(RejectReason::NotTracked));
        };
        if entry.is_conflicted() {
            return Ok(Verdict::Reject(RejectReason::Conflicted));
        }

        if let Some(existing) = self.repository.workspace().lstat(destination)
            && !self.is_case_only_rename(source, destination)
        {
            if !self.options.force {
                return Ok(Verdict::Reject(RejectReason::DestinationExists));
            }

            let file_type = existing.file_type();
            if !(file_type.is_file() || file_type.is_symlink()) {
                return Ok(Verdict::Reject(RejectReason::CannotOverwrite));
            }

            let verdict = self.claim(item, Verdict::accept(item.mode));
            if self.options.verbose && matches!(verdict, Verdict::Accept { .. }) {
                eprintln!("{} overwriting '{}'", "warning:".yellow(), destination.display());
            }
            return Ok(verdict);
        }

        if self.claimed.contains(destination) {
            return Ok(Verdict::Reject(RejectReason::MultipleSources));
        }

        if has_trailing_slash(destination) {
            return Ok(Verdict::Reject(RejectReason::DestinationDirectoryMissing));
        }

        if !self.options.sparse {
            let excluded = [source, destination]
                .into_iter()
                .filter(|path| !self.sparse.in_cone(path))
                .map(Path::to_path_buf)
                .collect::<Vec<_>>();

            if !excluded.is_empty() {
                return Ok(Verdict::Exclude(excluded));
            }
        }

        Ok(Verdict::accept(item.mode))
    }

    /// Accept or expand unless another item already moves to the same place
    fn claim(&self, item: &WorkItem, verdict: Verdict) -> Verdict {
        match self.claimed.contains(&item.destination) {
            true => Verdict::Reject(RejectReason::MultipleSources),
            false => verdict,
        }
    }

    fn is_case_only_rename(&self, source: &Path, destination: &Path) -> bool {
        self.ignore_case
            && source
                .to_string_lossy()
                .eq_ignore_ascii_case(&destination.to_string_lossy())
    }
}
