//! Git object types and operations
//!
//! Git stores all content as objects identified by SHA-1 hashes. Relocating paths
//! only ever needs blobs: to hash working tree files when staging them and to read
//! content back when an entry has to be materialized in the working tree.
//!
//! All objects implement serialization/deserialization for the Git object format:
//! `<type> <size>\0<content>`

pub mod blob;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
