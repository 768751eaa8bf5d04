//! Git data structures and algorithms
//!
//! - `config`: git-config files (`.git/config`, `.gitmodules`)
//! - `core`: Lexical path helpers
//! - `index`: Index file format (header, entries, checksum, lock file)
//! - `objects`: Object ids and blobs
//! - `relocation`: The engine behind `mv`
//! - `sparse`: Sparse-checkout cone patterns
//! - `submodule`: Gitfiles and `.gitmodules` rewriting

pub mod config;
pub mod core;
pub mod index;
pub mod objects;
pub mod relocation;
pub mod sparse;
pub mod submodule;
