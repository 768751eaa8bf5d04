use crate::areas::repository::Repository;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{Context, anyhow};
use std::io::BufRead;
use std::path::{Path, PathBuf};

const INDEX_INFO_REGEX: &str = r"^([0-7]+) ([0-9a-fA-F]{40}) ([0-3])\t(.+)$";

#[derive(Debug, Clone, Default)]
pub struct UpdateIndexOptions {
    /// `Some(true)` sets skip-worktree on `paths`, `Some(false)` clears it
    pub skip_worktree: Option<bool>,
    /// `<mode>,<object id>,<path>` triples
    pub cacheinfo: Vec<String>,
    /// Read `<mode> <object id> <stage>\t<path>` lines from the input
    pub index_info: bool,
    pub paths: Vec<String>,
}

impl Repository {
    pub async fn update_index(
        &mut self,
        options: UpdateIndexOptions,
        input: impl BufRead,
    ) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        let lock = index.hold_lock()?;
        index.rehydrate()?;

        for cacheinfo in &options.cacheinfo {
            let entry = Self::parse_cacheinfo(cacheinfo)?;
            index.add(entry)?;
        }

        if options.index_info {
            let regex = regex::Regex::new(INDEX_INFO_REGEX)?;

            for line in input.lines() {
                let line = line?;
                if line.is_empty() {
                    continue;
                }

                let captures = regex
                    .captures(&line)
                    .ok_or_else(|| anyhow!("malformed index info {line}"))?;
                let path = PathBuf::from(&captures[4]);

                // mode 0 drops the path
                if u32::from_str_radix(&captures[1], 8)? == 0 {
                    index.remove(&path)?;
                    continue;
                }

                let mode = EntryMode::try_from(&captures[1])?;
                let oid = ObjectId::try_parse(captures[2].to_string())?;
                let mut entry = IndexEntry::new(path, oid, EntryMetadata::with_mode(mode));
                entry.stage = captures[3].parse()?;

                index.add(entry)?;
            }
        }

        if let Some(skip_worktree) = options.skip_worktree {
            for path in &options.paths {
                let path = self.prefix().join(path);
                let entry = index
                    .entry_by_path_mut(&path)
                    .ok_or_else(|| anyhow!("Unable to mark file {}", path.display()))?;

                entry.set_skip_worktree(skip_worktree);
            }
        }

        index.write_updates(lock)?;

        Ok(())
    }

    fn parse_cacheinfo(cacheinfo: &str) -> anyhow::Result<IndexEntry> {
        let mut parts = cacheinfo.splitn(3, ',');

        let (Some(mode), Some(oid), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(anyhow!("option 'cacheinfo' expects <mode>,<sha1>,<path>"));
        };
        let mode = EntryMode::try_from(mode)
            .with_context(|| format!("git update-index: --cacheinfo cannot add {path}"))?;
        let oid = ObjectId::try_parse(oid.to_string())?;

        Ok(IndexEntry::new(
            Path::new(path).to_path_buf(),
            oid,
            EntryMetadata::with_mode(mode),
        ))
    }
}
