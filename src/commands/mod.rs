//! Command implementations
//!
//! Commands are methods on [`Repository`](crate::areas::repository::Repository),
//! split the way git splits them:
//!
//! - `plumbing`: low-level index inspection and editing (ls-files, update-index)
//! - `porcelain`: user-facing commands (init, add, mv)

pub mod plumbing;
pub mod porcelain;
