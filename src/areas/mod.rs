//! Core repository components
//!
//! - `database`: Loose object storage
//! - `index`: Staging area, read and written under `index.lock`
//! - `repository`: Discovery and access to everything below `.git`
//! - `workspace`: Working tree file system operations

pub mod database;
pub mod index;
pub mod repository;
pub mod workspace;
