use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::relocation::rejection::MoveError;
use crate::artifacts::submodule::SubmoduleLink;
use crate::artifacts::submodule::gitfile::Gitfile;
use crate::artifacts::submodule::gitmodules::GITMODULES_FILE;
use std::path::Path;

/// Checks a gitlink can be moved and records how its repository is linked
pub struct SubmodulePreparer<'r> {
    repository: &'r Repository,
    index: &'r Index,
}

impl<'r> SubmodulePreparer<'r> {
    pub fn new(repository: &'r Repository, index: &'r Index) -> Self {
        SubmodulePreparer { repository, index }
    }

    /// Prepare moving the directory `source`, tracked by a single index entry
    pub fn prepare(&self, source: &Path) -> anyhow::Result<SubmoduleLink> {
        let is_gitlink = self
            .index
            .entry_by_path(source)
            .is_some_and(|entry| entry.mode().is_gitlink());
        if !is_gitlink {
            return Err(MoveError::NotASubmodule(source.to_path_buf()).into());
        }

        if !self.is_staging_gitmodules_ok()? {
            return Err(MoveError::GitmodulesNotStaged.into());
        }

        let link = match Gitfile::read(&self.repository.workspace().absolute(source))? {
            Some(gitdir) => SubmoduleLink::Gitfile(gitdir),
            None => SubmoduleLink::Gitdir,
        };

        tracing::debug!(source = %source.display(), ?link, "prepared submodule move");
        Ok(link)
    }

    /// `.gitmodules` is either untracked, missing, or identical to its staged blob
    fn is_staging_gitmodules_ok(&self) -> anyhow::Result<bool> {
        let path = Path::new(GITMODULES_FILE);
        let Some(entry) = self.index.entry_by_path(path) else {
            return Ok(true);
        };
        if !self.repository.workspace().exists(path) {
            return Ok(true);
        }

        let blob = self.repository.workspace().parse_blob(path)?;
        Ok(blob.object_id()? == entry.oid)
    }
}
