use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use bytes::Bytes;
use std::fs::Metadata;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

/// Working tree rooted at the repository top level
///
/// All paths handed to the workspace are relative to its root.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.path.join(path)
    }

    /// Stat without following a trailing symlink, `None` when nothing is there
    pub fn lstat(&self, path: &Path) -> Option<Metadata> {
        std::fs::symlink_metadata(self.absolute(path)).ok()
    }

    /// Whether anything (file, directory, dangling symlink) occupies `path`
    pub fn exists(&self, path: &Path) -> bool {
        self.lstat(path).is_some()
    }

    /// Whether `path` is a directory, following symlinks
    pub fn is_dir(&self, path: &Path) -> bool {
        self.absolute(path).is_dir()
    }

    pub fn parse_blob(&self, path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(path)?))
    }

    /// All files below `root` (or the whole tree), relative to the workspace root
    pub fn list_files(&self, root: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root = match root {
            Some(path) => self.absolute(path),
            None => self.path.to_path_buf(),
        };

        let metadata = std::fs::symlink_metadata(&root)
            .with_context(|| format!("pathspec '{}' did not match any files", root.display()))?;

        if !metadata.is_dir() {
            return Ok(self.relative(&root).into_iter().collect());
        }

        let mut files = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| !entry.file_type().is_dir())
            .filter_map(|entry| self.relative(entry.path()))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(self.path.as_ref())
            .ok()
            .map(Path::to_path_buf)
    }

    /// File content, or the link target for symbolic links
    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let absolute = self.absolute(file_path);
        let metadata = std::fs::symlink_metadata(&absolute)
            .with_context(|| format!("Unable to stat '{}'", file_path.display()))?;

        let content = if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&absolute)?;
            target.to_string_lossy().as_bytes().to_vec()
        } else {
            std::fs::read(&absolute)
                .with_context(|| format!("Unable to read '{}'", file_path.display()))?
        };

        Ok(Bytes::from(content))
    }

    pub fn stat_file(&self, file_path: &Path) -> anyhow::Result<EntryMetadata> {
        let absolute = self.absolute(file_path);
        let metadata = std::fs::symlink_metadata(&absolute)
            .with_context(|| format!("Unable to stat '{}'", file_path.display()))?;

        (absolute.as_path(), metadata).try_into()
    }

    /// Rename in the working tree, both paths relative to the root
    pub fn rename(&self, source: &Path, destination: &Path) -> std::io::Result<()> {
        std::fs::rename(self.absolute(source), self.absolute(destination))
    }

    /// Materialize an index entry from its blob content
    ///
    /// Missing parent directories are created and whatever occupies the path is
    /// replaced. Returns the fresh stat data for the index.
    pub fn checkout_entry(&self, entry: &IndexEntry, data: &[u8]) -> anyhow::Result<EntryMetadata> {
        let path = self.absolute(&entry.name);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        if let Ok(metadata) = std::fs::symlink_metadata(&path) {
            match metadata.is_dir() {
                true => std::fs::remove_dir_all(&path),
                false => std::fs::remove_file(&path),
            }
            .with_context(|| format!("Failed to remove existing path: {:?}", entry.name))?;
        }

        match entry.mode() {
            EntryMode::Symlink => {
                let target = PathBuf::from(String::from_utf8_lossy(data).to_string());
                std::os::unix::fs::symlink(target, &path)
                    .with_context(|| format!("Failed to create symlink: {:?}", entry.name))?;
            }
            mode => {
                let mut file = std::fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path)
                    .with_context(|| format!("Failed to open file: {:?}", entry.name))?;

                file.write_all(data)
                    .with_context(|| format!("Failed to write to file: {:?}", entry.name))?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let permissions = std::fs::Permissions::from_mode(mode.as_u32() & 0o777);
                    std::fs::set_permissions(&path, permissions).with_context(|| {
                        format!("Failed to set permissions for file: {:?}", entry.name)
                    })?;
                }
            }
        }

        self.stat_file(&entry.name)
    }
}
