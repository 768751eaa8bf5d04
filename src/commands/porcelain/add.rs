use crate::areas::repository::Repository;
use crate::artifacts::core::normalize;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::relocation::rejection::MoveError;
use std::path::Path;

impl Repository {
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        let lock = index.hold_lock()?;
        index.rehydrate()?;

        // Expand directories into the files below them
        let paths = paths
            .iter()
            .map(|path| {
                let path = normalize(&self.prefix().join(Path::new(path)))
                    .ok_or_else(|| MoveError::OutsideRepository(path.clone()))?;
                self.workspace().list_files(Some(&path))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .flatten();

        for path in paths {
            let blob = self.workspace().parse_blob(&path)?;
            let stat = self.workspace().stat_file(&path)?;

            let blob_id = self.database().store(blob)?;
            index.add(IndexEntry::new(path, blob_id, stat))?;
        }

        index.write_updates(lock)?;

        Ok(())
    }
}
