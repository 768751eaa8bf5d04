use crate::areas::repository::Repository;

#[derive(Debug, Clone, Copy, Default)]
pub struct LsFilesOptions {
    /// Show mode, object id and stage of every entry
    pub stage: bool,
    /// Prefix every path with its status tag
    pub tags: bool,
}

impl Repository {
    pub async fn ls_files(&mut self, options: LsFilesOptions) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for entry in index.entries() {
            let mut line = String::new();

            if options.tags {
                line.push_str(match entry.is_skip_worktree() {
                    true => "S ",
                    false => "H ",
                });
            }
            if options.stage {
                line.push_str(&format!(
                    "{} {} {}\t",
                    entry.mode().as_str(),
                    entry.oid,
                    entry.stage
                ));
            }
            line.push_str(entry.path_str()?);

            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }
}
