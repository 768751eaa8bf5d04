//! Porcelain commands
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files
//! - `mv`: Move or rename files, directories and submodules

pub mod add;
pub mod init;
pub mod mv;
