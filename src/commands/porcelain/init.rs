use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;

const DEFAULT_BRANCH: &str = "master";
const DEFAULT_CONFIG: &str = "[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n\tbare = false\n";

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        let git_dir = self.git_dir();

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        fs::create_dir_all(git_dir.join("refs").join("heads"))
            .context("Failed to create .git/refs/heads directory")?;

        fs::create_dir_all(git_dir.join("info")).context("Failed to create .git/info directory")?;

        let head_path = git_dir.join("HEAD");
        if !head_path.exists() {
            fs::write(&head_path, format!("ref: refs/heads/{DEFAULT_BRANCH}\n"))
                .context("Failed to create initial HEAD reference")?;
        }

        let config_path = git_dir.join("config");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG).context("Failed to create .git/config")?;
        }

        writeln!(
            self.writer(),
            "Initialized empty Git repository in {}",
            git_dir.display()
        )?;

        Ok(())
    }
}
