//! Why a move was refused
//!
//! Structural rejections are tied to one source and can be skipped with `-k`.
//! Sparse advisories name paths outside the sparse-checkout cone and are
//! reported together once classification is over.

use colored::Colorize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    #[error("bad source")]
    BadSource,
    #[error("can not move directory into itself")]
    MoveIntoItself,
    #[error("cannot move directory over file")]
    DirectoryOverFile,
    #[error("source directory is empty")]
    SourceDirectoryEmpty,
    #[error("not under version control")]
    NotTracked,
    #[error("conflicted")]
    Conflicted,
    #[error("destination exists")]
    DestinationExists,
    #[error("Cannot overwrite")]
    CannotOverwrite,
    #[error("multiple sources for the same target")]
    MultipleSources,
    #[error("destination directory does not exist")]
    DestinationDirectoryMissing,
}

/// Errors of the relocation engine that end the command
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("{reason}, source={}, destination={}", .src.display(), .dst.display())]
    Rejected {
        reason: RejectReason,
        src: PathBuf,
        dst: PathBuf,
    },
    #[error("destination '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("'{0}' is outside repository")]
    OutsideRepository(String),
    #[error("{} is in index", .0.display())]
    DirectoryInIndex(PathBuf),
    #[error("Directory {} is in index and no submodule?", .0.display())]
    NotASubmodule(PathBuf),
    #[error("Please stage your changes to .gitmodules or stash them to proceed")]
    GitmodulesNotStaged,
    #[error("Cannot change unmerged .gitmodules, resolve merge conflicts first")]
    GitmodulesUnmerged,
    #[error("renaming '{}' failed", .0.display())]
    RenameFailed(PathBuf),
    #[error("cannot checkout {}", .0.display())]
    CheckoutFailed(PathBuf),
    #[error("Unable to write new index file")]
    IndexWriteFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn into_error(self) -> MoveError {
        MoveError::Rejected {
            reason: self.reason,
            src: self.source,
            dst: self.destination,
        }
    }
}

/// Everything refused during classification, in the order it was found
#[derive(Debug, Clone, Default)]
pub struct RejectionLedger {
    rejections: Vec<Rejection>,
    sparse_paths: Vec<PathBuf>,
}

impl RejectionLedger {
    pub fn reject(&mut self, source: &Path, destination: &Path, reason: RejectReason) -> Rejection {
        let rejection = Rejection {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            reason,
        };
        self.rejections.push(rejection.clone());

        rejection
    }

    pub fn advise_sparse(&mut self, path: &Path) {
        if !self.sparse_paths.iter().any(|known| known == path) {
            self.sparse_paths.push(path.to_path_buf());
        }
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn sparse_paths(&self) -> &[PathBuf] {
        &self.sparse_paths
    }

    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty() && self.sparse_paths.is_empty()
    }

    /// Advice listing out-of-cone paths, `None` when there are none
    pub fn sparse_advice(&self) -> Option<String> {
        if self.sparse_paths.is_empty() {
            return None;
        }

        let mut advice = String::from(
            "The following paths and/or pathspecs matched paths that exist\n\
            outside of your sparse-checkout definition, so will not be\n\
            updated in the index:\n",
        );
        for path in &self.sparse_paths {
            advice.push_str(&format!("{}\n", path.display()));
        }

        let hint = "hint:".yellow();
        for line in [
            "If you intend to update such entries, try one of the following:",
            "* Use the --sparse option.",
            "* Disable or modify the sparsity rules.",
        ] {
            advice.push_str(&format!("{hint} {line}\n"));
        }

        Some(advice)
    }
}
