//! Plumbing commands
//!
//! Direct access to the index, mostly useful to set up and inspect the states
//! `mv` has to deal with: skip-worktree entries, gitlinks and unmerged paths.
//!
//! ## Commands
//!
//! - `ls-files`: List index entries, optionally with stage data and tags
//! - `update-index`: Toggle skip-worktree, register entries by object id

pub mod ls_files;
pub mod update_index;
