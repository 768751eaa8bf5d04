//! Path relocation engine behind `mv`
//!
//! Moving paths happens in two phases over a single locked index:
//!
//! 1. **Classification**: arguments are normalized into work items
//!    (`path_normalizer`), then every item is checked against the working tree,
//!    the index and the sparse-checkout cone (`classifier`). Directories are
//!    expanded into one item per tracked entry (`directory_expander`) and
//!    submodules are inspected (`submodule_preparer`). Rejected items leave the
//!    work list (`work_list`) or abort the whole command.
//! 2. **Execution**: surviving items are applied in order (`executor`): working
//!    tree renames, submodule relinking and index rewrites. The index is written
//!    once at the end.
//!
//! Nothing is modified before classification has fully succeeded. Changes made
//! during execution are not rolled back when a later item fails.

pub mod classifier;
pub mod directory_expander;
pub mod executor;
pub mod path_normalizer;
pub mod rejection;
pub mod submodule_preparer;
pub mod work_item;
pub mod work_list;

/// Flags of a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Report every rename
    pub verbose: bool,
    /// Only report what would happen
    pub dry_run: bool,
    /// Overwrite existing destination files
    pub force: bool,
    /// Skip refused moves instead of aborting (`-k`)
    pub ignore_errors: bool,
    /// Allow moving paths outside the sparse-checkout cone
    pub sparse: bool,
}

/// What a move did, mapped to the command's exit status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: usize,
    pub skipped: usize,
    /// Out-of-cone paths stopped the command before anything was changed
    pub sparse_blocked: bool,
}

impl MoveOutcome {
    pub fn sparse_blocked() -> Self {
        MoveOutcome {
            sparse_blocked: true,
            ..Default::default()
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.sparse_blocked || self.skipped > 0 {
            true => 1,
            false => 0,
        }
    }
}
