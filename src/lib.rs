//! `bitmv` moves and renames tracked paths in a git-compatible repository.
//!
//! The crate is laid out like a small git implementation:
//!
//! - `areas`: the on-disk parts of a repository (index, object database, workspace, config)
//! - `artifacts`: data structures and algorithms operating on those areas,
//!   most notably the path relocation engine in `artifacts::relocation`
//! - `commands`: the user-facing commands built on top of both

pub mod areas;
pub mod artifacts;
pub mod commands;
