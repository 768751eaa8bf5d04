//! Submodule support needed to relocate gitlinks
//!
//! - `gitfile`: reading and rewriting the `.git` file of a submodule working tree
//! - `gitmodules`: the superproject's `.gitmodules` mapping names to paths

pub mod gitfile;
pub mod gitmodules;

use std::path::PathBuf;

/// How a submodule working tree is linked to its repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmoduleLink {
    /// Not a submodule
    #[default]
    None,
    /// `.git` file pointing at this git directory
    Gitfile(PathBuf),
    /// Embedded `.git` directory, which moves along with the working tree
    Gitdir,
}

impl SubmoduleLink {
    pub fn is_submodule(&self) -> bool {
        !matches!(self, SubmoduleLink::None)
    }
}
