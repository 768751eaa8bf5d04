use crate::areas::repository::Repository;
use crate::artifacts::relocation::executor::MoveExecutor;
use crate::artifacts::relocation::path_normalizer::PathNormalizer;
use crate::artifacts::relocation::rejection::MoveError;
use crate::artifacts::relocation::classifier::MoveClassifier;
use crate::artifacts::relocation::{MoveOptions, MoveOutcome};
use anyhow::Context;

impl Repository {
    /// Move or rename files, directories and submodules
    ///
    /// The index stays locked from the moment it is read until the updated
    /// version is written, so the whole command sees a single index.
    pub async fn mv(&mut self, paths: &[String], options: MoveOptions) -> anyhow::Result<MoveOutcome> {
        let index = self.index();
        let mut index = index.lock().await;

        let lock = index.hold_lock()?;
        index.rehydrate()?;

        let sparse = self.sparse_checkout()?;
        let ignore_case = self.ignore_case()?;

        let items = PathNormalizer::new(self.workspace(), self.prefix()).normalize(paths)?;
        let classification =
            MoveClassifier::new(self, &index, &sparse, options, ignore_case).classify(items)?;
        let ledger = classification.ledger;

        if let Some(advice) = ledger.sparse_advice() {
            eprint!("{advice}");

            if !options.ignore_errors {
                lock.rollback();
                return Ok(MoveOutcome::sparse_blocked());
            }
        }

        let report = MoveExecutor::new(self, &mut index, &sparse, options)
            .apply(classification.work_list.into_items())?;

        if index.is_changed() {
            index
                .write_updates(lock)
                .context(MoveError::IndexWriteFailed)?;
        } else {
            lock.rollback();
        }

        Ok(MoveOutcome {
            moved: report.moved,
            skipped: ledger.rejections().len() + ledger.sparse_paths().len() + report.skipped,
            sparse_blocked: false,
        })
    }
}
