use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::config::config_file::ConfigFile;
use crate::artifacts::sparse::SparseCheckout;
use anyhow::anyhow;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const GIT_DIR: &str = ".git";

pub struct Repository {
    path: Box<Path>,
    /// Invocation directory relative to `path`, empty at the top level
    prefix: PathBuf,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
}

impl Repository {
    /// Open the repository whose working tree is rooted at `path`
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }

        Ok(Self::open(path.canonicalize()?, PathBuf::new(), writer))
    }

    /// Find the repository containing `cwd` by walking up to the first `.git`
    pub fn discover(cwd: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let cwd = cwd.canonicalize()?;

        let root = cwd
            .ancestors()
            .find(|dir| dir.join(GIT_DIR).is_dir())
            .ok_or_else(|| {
                anyhow!("not a git repository (or any of the parent directories): {GIT_DIR}")
            })?
            .to_path_buf();
        let prefix = cwd.strip_prefix(&root)?.to_path_buf();

        tracing::debug!(root = %root.display(), prefix = %prefix.display(), "discovered repository");
        Ok(Self::open(root, prefix, writer))
    }

    fn open(path: PathBuf, prefix: PathBuf, writer: Box<dyn std::io::Write>) -> Self {
        let git_dir = path.join(GIT_DIR);
        let index = Index::new(git_dir.join("index").into_boxed_path());
        let database = Database::new(git_dir.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());

        Repository {
            path: path.into_boxed_path(),
            prefix,
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path.join(GIT_DIR)
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// `.git/config`, read together with `.git/config.worktree` once
    /// `extensions.worktreeConfig` is on, which is where `git sparse-checkout`
    /// keeps its settings
    pub fn config(&self) -> anyhow::Result<ConfigFile> {
        let config = ConfigFile::open(&self.git_dir().join("config"))?;

        if !config
            .get_bool("extensions", None, "worktreeconfig")?
            .unwrap_or(false)
        {
            return Ok(config);
        }

        let worktree_config = ConfigFile::open(&self.git_dir().join("config.worktree"))?;
        tracing::debug!(exists = worktree_config.exists(), "layering worktree config");

        Ok(config.layered(worktree_config))
    }

    pub fn ignore_case(&self) -> anyhow::Result<bool> {
        Ok(self
            .config()?
            .get_bool("core", None, "ignorecase")?
            .unwrap_or(false))
    }

    pub fn sparse_checkout(&self) -> anyhow::Result<SparseCheckout> {
        SparseCheckout::load(&self.git_dir(), &self.config()?)
    }
}
