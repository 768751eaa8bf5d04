//! Core utilities and shared types
//!
//! Lexical path helpers shared by the index, the sparse-checkout matcher and the
//! relocation engine. None of them touch the file system.

use std::path::{Component, Path, PathBuf};

/// Whether the path was spelled with a trailing `/`
pub fn has_trailing_slash(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().last() == Some(&b'/')
}

/// `dir` followed by a single `/`
pub fn with_trailing_slash(path: &Path) -> PathBuf {
    let mut path = strip_trailing_slashes(path);
    path.push("");
    path
}

pub fn strip_trailing_slashes(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Resolve `.` and `..` without consulting the file system
///
/// Returns `None` when the path climbs above its starting point. Absolute
/// paths keep their root.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normalized.pop();
                depth -= 1;
            }
            Component::Normal(name) => {
                normalized.push(name);
                depth += 1;
            }
            root => normalized.push(root.as_os_str()),
        }
    }

    Some(normalized)
}

/// Path leading from directory `from` to `to`, e.g. `../../.git/modules/sub`
///
/// Both paths must be normalized and anchored at the same base.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = from.components().collect::<Vec<_>>();
    let to = to.components().collect::<Vec<_>>();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }

    relative
}
