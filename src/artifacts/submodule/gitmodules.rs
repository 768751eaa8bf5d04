use crate::artifacts::config::config_file::ConfigFile;
use std::path::Path;

pub const GITMODULES_FILE: &str = ".gitmodules";

/// Outcome of rewriting a submodule path in `.gitmodules`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathUpdate {
    Updated,
    /// There is no `.gitmodules` to update
    NoGitmodules,
    /// No `submodule.*.path` names the old path
    NoSection,
}

/// The superproject's `.gitmodules`
#[derive(Debug)]
pub struct Gitmodules {
    config: ConfigFile,
}

impl Gitmodules {
    pub fn open(work_tree: &Path) -> anyhow::Result<Self> {
        Ok(Gitmodules {
            config: ConfigFile::open(&work_tree.join(GITMODULES_FILE))?,
        })
    }

    pub fn exists(&self) -> bool {
        self.config.exists()
    }

    /// Name of the submodule checked out at `path`
    pub fn submodule_name(&self, path: &Path) -> Option<String> {
        self.config
            .find_subsection("submodule", "path", &path.to_string_lossy())
    }

    /// Rewrite `submodule.<name>.path` from `old` to `new` and save the file
    pub fn update_path(&mut self, old: &Path, new: &Path) -> anyhow::Result<PathUpdate> {
        if !self.exists() {
            return Ok(PathUpdate::NoGitmodules);
        }

        let Some(name) = self.submodule_name(old) else {
            tracing::warn!(path = %old.display(), "no .gitmodules section for submodule");
            return Ok(PathUpdate::NoSection);
        };

        self.config
            .set("submodule", Some(&name), "path", &new.to_string_lossy());
        self.config.save()?;

        tracing::debug!(%name, from = %old.display(), to = %new.display(), "updated .gitmodules");
        Ok(PathUpdate::Updated)
    }
}
