//! Index entry representation
//!
//! Each entry in the index represents a tracked path with:
//! - File path
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//! - Conflict stage and per-entry flags (skip-worktree, intent-to-add)
//!
//! ## Entry Format
//!
//! Entries are stored in a binary format with 8-byte alignment for efficient reading.
//! The 16-bit flags field packs the assume-valid bit, the extended bit, the stage
//! and the name length. When the extended bit is set (index version 3), a second
//! 16-bit field carrying the skip-worktree and intent-to-add bits follows.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Longest name length that fits in the flags field
const NAME_MASK: u16 = 0x0fff;

/// Stage bits inside the on-disk flags field
const STAGE_MASK: u16 = 0x3000;
const STAGE_SHIFT: u16 = 12;

/// Set when an extended flags field follows the regular one
const EXTENDED_BIT: u16 = 0x4000;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed part of an entry, up to and including the flags field
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

bitflags! {
    /// In-memory entry flags
    ///
    /// The low half mirrors the on-disk flags field, the high half mirrors the
    /// extended flags field of version 3 indexes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryFlags: u32 {
        const ASSUME_VALID = 0x8000;
        const INTENT_TO_ADD = 0x2000 << 16;
        const SKIP_WORKTREE = 0x4000 << 16;
    }
}

impl EntryFlags {
    /// Flags that can only be stored in a version 3 index
    pub fn is_extended(&self) -> bool {
        self.intersects(EntryFlags::INTENT_TO_ADD | EntryFlags::SKIP_WORKTREE)
    }
}

/// Index entry representing a tracked path
///
/// Contains the file path, content hash, and metadata needed for
/// efficient change detection.
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: PathBuf,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
    /// Conflict stage, 0 for a merged entry
    #[new(default)]
    pub stage: u8,
    /// Assume-valid, skip-worktree and intent-to-add bits
    #[new(default)]
    pub flags: EntryFlags,
}

impl IndexEntry {
    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name"))
    }

    /// Entry name as stored on disk
    pub fn path_str(&self) -> anyhow::Result<&str> {
        self.name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid entry name: {}", self.name.display()))
    }

    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();
        dirs
    }

    pub fn mode(&self) -> EntryMode {
        self.metadata.mode
    }

    pub fn is_skip_worktree(&self) -> bool {
        self.flags.contains(EntryFlags::SKIP_WORKTREE)
    }

    pub fn set_skip_worktree(&mut self, skip: bool) {
        self.flags.set(EntryFlags::SKIP_WORKTREE, skip);
    }

    pub fn is_conflicted(&self) -> bool {
        self.stage != 0
    }

    /// Same entry under a different path, keeping oid, mode, stage and flags
    pub fn renamed(&self, name: PathBuf) -> Self {
        IndexEntry {
            name,
            ..self.clone()
        }
    }

    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    fn on_disk_flags(&self, name_len: usize) -> u16 {
        let mut flags = (self.flags.bits() & 0xffff) as u16;
        if self.flags.is_extended() {
            flags |= EXTENDED_BIT;
        }
        flags |= ((self.stage as u16) << STAGE_SHIFT) & STAGE_MASK;
        flags | (name_len.min(NAME_MASK as usize) as u16)
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.stage == other.stage
    }
}

impl Eq for IndexEntry {}

/// File metadata stored in index entries
///
/// Contains both file status information (mode, size, inode) and timestamps.
/// This metadata enables quick change detection without reading content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: i64,
    /// Change time nanoseconds
    pub ctime_nsec: i64,
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Modification time nanoseconds
    pub mtime_nsec: i64,
    /// Device ID
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// File mode (permissions and type)
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u64,
}

impl EntryMetadata {
    /// Metadata for an entry that has no working tree counterpart
    pub fn with_mode(mode: EntryMode) -> Self {
        EntryMetadata {
            mode,
            ..Default::default()
        }
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self.path_str()?;
        let entry_mode = self.metadata.mode.as_u32();

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(entry_mode)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes
            .write_u16::<byteorder::NetworkEndian>(self.on_disk_flags(entry_name.len()))?;
        if self.flags.is_extended() {
            entry_bytes.write_u16::<byteorder::NetworkEndian>((self.flags.bits() >> 16) as u16)?;
        }
        entry_bytes.write_all(entry_name.as_bytes())?;

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let bytes = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("Invalid index entry size"));
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let mut oid_bytes = std::io::Cursor::new(&bytes[40..60]);
        let oid = ObjectId::read_h40_from(&mut oid_bytes)?;
        let disk_flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        let mut flags = EntryFlags::from_bits_truncate((disk_flags & 0x8000) as u32);
        let mut name_start = ENTRY_FIXED_SIZE;
        if disk_flags & EXTENDED_BIT != 0 {
            let extended = byteorder::NetworkEndian::read_u16(&bytes[62..64]) as u32;
            flags |= EntryFlags::from_bits_truncate(extended << 16);
            name_start += 2;
        }
        let stage = ((disk_flags & STAGE_MASK) >> STAGE_SHIFT) as u8;

        // Extract the entry name, which is null-terminated
        let name_end = bytes[name_start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("Missing null terminator in entry name"))?;
        let name_bytes = &bytes[name_start..name_start + name_end];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| anyhow::anyhow!("Invalid UTF-8 in entry name"))?,
        );

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            stage,
            flags,
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let file_type = metadata.file_type();
        let mode = if file_type.is_dir() {
            EntryMode::Directory
        } else if file_type.is_symlink() {
            EntryMode::Symlink
        } else {
            match file_path.is_executable() {
                true => EntryMode::File(FileMode::Executable),
                false => EntryMode::File(FileMode::Regular),
            }
        };

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
        })
    }
}
