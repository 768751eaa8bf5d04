//! Git index (staging area)
//!
//! The index tracks which paths are staged, together with their object ids, modes,
//! stat data, conflict stages and skip-worktree flags.
//!
//! ## Ordering
//!
//! Entries are kept sorted by the raw bytes of their path, then by stage, which
//! is the order git writes them in. A consequence the relocation engine relies on:
//! all entries below a directory `dir/` form one contiguous range.
//!
//! ## Data Structures
//!
//! - `entries`: Maps (path, stage) keys to their index entries
//! - `children`: Maps directory paths to the entry paths below them, used to
//!   resolve file/directory conflicts when adding entries

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{
    ENTRY_BLOCK, ENTRY_FIXED_SIZE, EntryMetadata, IndexEntry,
};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::lockfile::Lockfile;
use crate::artifacts::index::{
    CHECKSUM_SIZE, EXTENSION_HEADER_SIZE, HEADER_SIZE, SIGNATURE, VERSION, VERSION_EXTENDED,
    VERSION_PATH_COMPRESSED,
};
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::{Context, anyhow};
use byteorder::ByteOrder;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::Path;

/// Highest conflict stage
const MAX_STAGE: u8 = 3;

/// Name lengths at or above this value are not stored in the flags field
const LONG_NAME: u16 = 0x0fff;

/// Sort key of an index entry: path bytes first, stage second
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    name: String,
    stage: u8,
}

impl EntryKey {
    pub fn new(path: &Path, stage: u8) -> anyhow::Result<Self> {
        let name = path
            .to_str()
            .ok_or_else(|| anyhow!("Invalid path: {}", path.display()))?;

        Ok(EntryKey {
            name: name.to_string(),
            stage,
        })
    }

    fn of(entry: &IndexEntry) -> anyhow::Result<Self> {
        Self::new(&entry.name, entry.stage)
    }
}

/// Git index (staging area)
///
/// Tracks staged paths along with their metadata. The index is persisted to
/// disk through a lock file and uses checksums for integrity verification.
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Tracked entries, sorted like the on-disk index
    entries: BTreeMap<EntryKey, IndexEntry>,
    /// Directory hierarchy for file/directory conflict detection
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    /// Index file header metadata
    header: IndexHeader,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    /// Create a new empty index
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the index file (typically `.git/index`)
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    /// Get the path to the index file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the in-memory index differs from what was loaded
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Take the exclusive `index.lock` for a read-modify-write cycle
    ///
    /// The lock must be taken before `rehydrate` so that nobody can update the
    /// index between reading it and writing it back.
    pub fn hold_lock(&self) -> anyhow::Result<Lockfile> {
        Lockfile::hold_for_update(self.path())
    }

    /// Look up the merged (stage 0) entry of a path
    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        EntryKey::new(path, 0)
            .ok()
            .and_then(|key| self.entries.get(&key))
    }

    /// Mutable access to the merged entry of a path
    ///
    /// The index is considered changed as soon as an entry is handed out.
    pub fn entry_by_path_mut(&mut self, path: &Path) -> Option<&mut IndexEntry> {
        let key = EntryKey::new(path, 0).ok()?;
        let entry = self.entries.get_mut(&key)?;
        self.changed = true;
        Some(entry)
    }

    /// Look up a path at any stage, preferring the lowest one
    ///
    /// A path with only unmerged entries yields its stage 1..3 entry, which lets
    /// callers tell "not tracked" apart from "conflicted".
    pub fn any_stage_entry(&self, path: &Path) -> Option<&IndexEntry> {
        let from = EntryKey::new(path, 0).ok()?;
        let to = EntryKey::new(path, MAX_STAGE).ok()?;

        self.entries.range(from..=to).map(|(_, entry)| entry).next()
    }

    /// All entries strictly below a directory, in index order
    ///
    /// Entries below `dir` share the `dir/` prefix, so this is a single range scan
    /// starting at the first key not smaller than `dir/`.
    pub fn entries_under(&self, dir: &Path) -> anyhow::Result<Vec<&IndexEntry>> {
        let prefix = Self::dir_prefix(dir)?;
        let start = EntryKey {
            name: prefix.clone(),
            stage: 0,
        };

        Ok(self
            .entries
            .range(start..)
            .take_while(|(key, _)| key.name.starts_with(&prefix))
            .map(|(_, entry)| entry)
            .collect())
    }

    /// Whether an entry is literally named `dir/`
    pub fn has_entry_with_trailing_slash(&self, dir: &Path) -> anyhow::Result<bool> {
        let prefix = Self::dir_prefix(dir)?;

        Ok((0..=MAX_STAGE).any(|stage| {
            self.entries.contains_key(&EntryKey {
                name: prefix.clone(),
                stage,
            })
        }))
    }

    fn dir_prefix(dir: &Path) -> anyhow::Result<String> {
        let dir = dir
            .to_str()
            .ok_or_else(|| anyhow!("Invalid path: {}", dir.display()))?;

        Ok(match dir.ends_with('/') {
            true => dir.to_string(),
            false => format!("{dir}/"),
        })
    }

    /// Clear all entries from the index
    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk
    ///
    /// Reads the index file, parses the header and entries, skips any extensions
    /// and verifies the checksum. A missing or empty file yields an empty index.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(self.path())
            .with_context(|| format!("Unable to open index file {}", self.path().display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let file_len = lock.deref_mut().metadata()?.len();
        if file_len == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;
        Self::skip_extensions(file_len, &mut reader)?;

        reader.verify().context("index file corrupt")?;
        self.changed = false;

        Ok(())
    }

    fn parse_header(&mut self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if !header.is_supported_version() {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        let entries_count = header.entries_count;
        self.header = header;

        Ok(entries_count)
    }

    /// Parse all entries from the index file
    ///
    /// Each entry is a fixed block, an optional extended flags field, the
    /// NUL-terminated path and padding up to the next 8-byte boundary. Version 4
    /// has no padding and stores the path relative to the previous entry's.
    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        let path_compressed = self.header.version == VERSION_PATH_COMPRESSED;
        let mut previous_name = Vec::new();

        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_FIXED_SIZE)?.to_vec();
            let flags = byteorder::NetworkEndian::read_u16(&entry_bytes[60..62]);

            if flags & 0x4000 != 0 {
                entry_bytes.extend_from_slice(&reader.read(2)?);
            }

            if path_compressed {
                let name = Self::read_compressed_name(&previous_name, reader)?;
                entry_bytes.extend_from_slice(&name);
                entry_bytes.push(0);
                entry_bytes.resize(entry_bytes.len().next_multiple_of(ENTRY_BLOCK), 0);
                previous_name = name;

                let entry = IndexEntry::deserialize(std::io::Cursor::new(entry_bytes))?;
                self.store_entry(entry)?;
                continue;
            }

            let name_len = flags & LONG_NAME;
            if name_len < LONG_NAME {
                entry_bytes.extend_from_slice(&reader.read(name_len as usize + 1)?);
            } else {
                loop {
                    let byte = reader.read(1)?;
                    entry_bytes.extend_from_slice(&byte);
                    if byte[0] == 0 {
                        break;
                    }
                }
            }

            let padding = (ENTRY_BLOCK - entry_bytes.len() % ENTRY_BLOCK) % ENTRY_BLOCK;
            entry_bytes.extend_from_slice(&reader.read(padding)?);

            let entry = IndexEntry::deserialize(std::io::Cursor::new(entry_bytes))?;
            self.store_entry(entry)?;
        }

        Ok(())
    }

    /// Version 4 entry name: a varint counting the bytes to drop from the end
    /// of the previous name, then the NUL-terminated suffix to append
    fn read_compressed_name(previous: &[u8], reader: &mut Checksum) -> anyhow::Result<Vec<u8>> {
        let mut byte = reader.read(1)?[0];
        let mut strip = (byte & 0x7f) as usize;
        while byte & 0x80 != 0 {
            byte = reader.read(1)?[0];
            strip = ((strip + 1) << 7) | (byte & 0x7f) as usize;
        }

        let keep = previous.len().checked_sub(strip).ok_or_else(|| {
            anyhow!(
                "index entry drops {strip} bytes of a {}-byte name",
                previous.len()
            )
        })?;

        let mut name = previous[..keep].to_vec();
        loop {
            match reader.read(1)?[0] {
                0 => break,
                byte => name.push(byte),
            }
        }

        Ok(name)
    }

    /// Skip over optional extensions (cache tree, resolve undo, ...)
    ///
    /// Their content is not kept: entries are rewritten by path, which would
    /// invalidate a cached tree anyway.
    fn skip_extensions(file_len: u64, reader: &mut Checksum) -> anyhow::Result<()> {
        while file_len.saturating_sub(reader.offset()) > CHECKSUM_SIZE as u64 {
            let header = reader.read(EXTENSION_HEADER_SIZE)?;
            let signature = String::from_utf8_lossy(&header[0..4]).to_string();
            let size = byteorder::NetworkEndian::read_u32(&header[4..8]);

            tracing::debug!(%signature, size, "skipping index extension");
            reader.read(size as usize)?;
        }

        Ok(())
    }

    /// Remove any conflicting entries before adding a new entry
    ///
    /// Removes parent directories that are tracked as files, children entries if
    /// this entry is becoming a file, and unmerged stages a merged entry resolves.
    fn discard_conflicts(&mut self, entry: &IndexEntry) -> anyhow::Result<()> {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent)?;
        }
        self.remove_children(&entry.name)?;

        if entry.stage == 0 {
            self.remove_entry(&entry.name)?;
        } else {
            self.entries.remove(&EntryKey::new(&entry.name, 0)?);
        }

        Ok(())
    }

    fn store_entry(&mut self, entry: IndexEntry) -> anyhow::Result<()> {
        let entry_parents = entry
            .parent_dirs()
            .into_iter()
            .map(|parent| parent.to_owned().into_boxed_path())
            .collect::<BTreeSet<_>>();

        for parent in entry_parents {
            self.children
                .entry(parent)
                .or_default()
                .insert(entry.name.clone().into_boxed_path());
        }

        self.entries.insert(EntryKey::of(&entry)?, entry);

        Ok(())
    }

    fn remove_children(&mut self, path_name: &Path) -> anyhow::Result<()> {
        if let Some(children) = self.children.remove(path_name) {
            for child in children {
                self.remove_entry(&child)?;
            }
        }

        Ok(())
    }

    /// Remove every stage of a path
    fn remove_entry(&mut self, path_name: &Path) -> anyhow::Result<()> {
        let from = EntryKey::new(path_name, 0)?;
        let to = EntryKey::new(path_name, MAX_STAGE)?;
        let keys = self
            .entries
            .range(from..=to)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();

        let Some(entry) = keys
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .last()
        else {
            return Ok(());
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path_name);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }

        Ok(())
    }

    pub fn add(&mut self, entry: IndexEntry) -> anyhow::Result<()> {
        self.discard_conflicts(&entry)?;
        self.store_entry(entry)?;

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;

        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> anyhow::Result<()> {
        self.remove_entry(path)?;
        self.remove_children(path)?;

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;

        Ok(())
    }

    /// Move the merged entry at `old` to `new`
    ///
    /// The entry keeps its object id, mode, stat data and flags. Whatever was
    /// tracked at `new` is replaced, and the entry is re-inserted at its sorted
    /// position rather than edited in place.
    pub fn rename_entry(&mut self, old: &Path, new: &Path) -> anyhow::Result<()> {
        let entry = self
            .entry_by_path(old)
            .ok_or_else(|| anyhow!("'{}' is not in the index", old.display()))?
            .renamed(new.to_path_buf());

        self.remove_entry(old)?;
        self.add(entry)?;

        tracing::debug!(from = %old.display(), to = %new.display(), "renamed index entry");
        Ok(())
    }

    pub fn update_entry_stat(&mut self, path: &Path, stat: EntryMetadata) {
        if let Some(existing_entry) = self.entry_by_path_mut(path) {
            existing_entry.metadata = stat;
        }
    }

    /// Write the index through a held lock and commit it
    ///
    /// The format version is 3 as soon as one entry needs extended flags, 2
    /// otherwise. A version 4 index is written back uncompressed.
    pub fn write_updates(&mut self, mut lock: Lockfile) -> anyhow::Result<()> {
        let version = match self.entries.values().any(|entry| entry.flags.is_extended()) {
            true => VERSION_EXTENDED,
            false => VERSION,
        };
        self.header = IndexHeader::new(String::from(SIGNATURE), version, self.entries.len() as u32);

        {
            let file = lock.file_mut()?;
            file.set_len(0)?;
            let guard = file_guard::lock(file, file_guard::Lock::Exclusive, 0, 1)?;
            let mut writer = Checksum::new(guard);

            writer.write(&self.header.serialize()?)?;
            for entry in self.entries() {
                writer.write(&entry.serialize()?)?;
            }
            writer.write_checksum()?;
        }

        lock.commit().context("Unable to write new index file")?;
        self.changed = false;

        tracing::info!(entries = self.entries.len(), version, "index written");
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
