//! Git index file format
//!
//! The index (also called staging area or cache) stores information about the working tree.
//! It tracks which paths are staged, at which conflict stage, and whether they are
//! materialized in the working tree at all (skip-worktree).
//!
//! ## File Format (Versions 2 and 3)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2, or 3 when any entry carries extended flags (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Each entry padded to 8-byte alignment
//!   - Contains metadata, flags and path
//!
//! Extensions (optional, skipped when reading):
//!   - 4-byte signature, 4-byte size, payload
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes, or all zeros when `index.skipHash` is set
//! ```
//!
//! Version 4 drops the entry padding and stores each path relative to the
//! previous one. It is read, never written.

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;
pub mod lockfile;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Size of an extension header (signature + payload size)
pub const EXTENSION_HEADER_SIZE: usize = 8;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// Index file format version
pub const VERSION: u32 = 2;

/// Index file format version with extended entry flags
pub const VERSION_EXTENDED: u32 = 3;

/// Index file format version with prefix-compressed entry names, read only
pub const VERSION_PATH_COMPRESSED: u32 = 4;
