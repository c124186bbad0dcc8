//! Detail run: visit one batch of links and store their records.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::checkpoint::{BatchStore, KeyValueCheckpoint};
use crate::config::DetailSelectors;
use crate::dom::Document;
use crate::record::DetailRecordBuilder;
use crate::store::{upsert_records, PersistenceSession};

use super::{DetailRunSummary, RunError};

/// Consumes the batch named by the cursor.
pub struct DetailRun {
    builder: DetailRecordBuilder,
    excluded_urls: Vec<String>,
}

impl DetailRun {
    pub fn new(selectors: DetailSelectors, excluded_urls: Vec<String>) -> Self {
        Self {
            builder: DetailRecordBuilder::new(selectors),
            excluded_urls,
        }
    }

    /// Process batch `cursor` and advance the cursor.
    ///
    /// Pages are visited in batch order and their records written in one
    /// transaction at the end. Once the cursor has been read it is saved as
    /// `cursor + 1` whatever the outcome, so a failing batch is never retried
    /// automatically.
    pub async fn run(
        &self,
        doc: &dyn Document,
        session: &mut PersistenceSession,
        cursor: &dyn KeyValueCheckpoint<u64>,
        batches: &BatchStore,
    ) -> Result<DetailRunSummary, RunError> {
        let index = cursor.load().await?.unwrap_or(0);
        info!("Starting detail run for batch {}", index);

        let result = self.process(doc, session, batches, index).await;

        if let Err(e) = cursor.save(&(index + 1)).await {
            error!("Failed to advance cursor past batch {}: {}", index, e);
            if result.is_ok() {
                return Err(e.into());
            }
        }

        match &result {
            Ok(summary) => info!(
                "Detail run for batch {} finished: {} stored, {} failed, {} skipped",
                index, summary.succeeded, summary.failed, summary.skipped
            ),
            Err(e) => error!("Detail run for batch {} failed: {}", index, e),
        }
        result
    }

    async fn process(
        &self,
        doc: &dyn Document,
        session: &mut PersistenceSession,
        batches: &BatchStore,
        index: u64,
    ) -> Result<DetailRunSummary, RunError> {
        let started_at = Utc::now();
        let urls = batches.load(index).await?;

        let mut records = Vec::with_capacity(urls.len());
        let mut failed = 0;
        let mut skipped = 0;
        let mut field_issues = 0;

        for (position, url) in urls.iter().enumerate() {
            if self.excluded_urls.iter().any(|e| e == url) {
                skipped += 1;
                continue;
            }

            match self.builder.build(doc, url).await {
                Ok(outcome) => {
                    field_issues += outcome.issues.len();
                    records.push(outcome.record);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    failed += 1;
                }
            }

            if (position + 1) % 50 == 0 {
                info!("Visited {}/{} links", position + 1, urls.len());
            }
        }

        let upserted = upsert_records(session, &records)?;

        Ok(DetailRunSummary {
            batch: index,
            total: urls.len(),
            succeeded: records.len(),
            failed,
            skipped,
            inserted: upserted.inserted,
            updated: upserted.updated,
            field_issues,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::checkpoint::{CheckpointError, MemoryCheckpoint};
    use crate::record::ContentRecord;
    use crate::store::StoreError;
    use crate::testing::{fixtures, MockDocument};

    /// Cursor that can be read but never written.
    struct ReadOnlyCursor(u64);

    #[async_trait]
    impl KeyValueCheckpoint<u64> for ReadOnlyCursor {
        async fn load(&self) -> Result<Option<u64>, CheckpointError> {
            Ok(Some(self.0))
        }

        async fn save(&self, _value: &u64) -> Result<(), CheckpointError> {
            Err(CheckpointError::Write {
                path: "cnt.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    async fn scripted_batch(batches: &BatchStore, ids: &[i64]) -> MockDocument {
        let doc = MockDocument::new();
        let urls: Vec<String> = ids.iter().map(|id| fixtures::detail_url(*id)).collect();
        for url in &urls {
            doc.add_page(url, fixtures::detail_page("Title")).await;
        }
        batches.store(0, &urls).await.unwrap();
        doc
    }

    fn detail_run() -> DetailRun {
        DetailRun::new(DetailSelectors::default(), Vec::new())
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_and_advances_cursor() {
        let temp_dir = tempfile::tempdir().unwrap();
        let batches = BatchStore::new(temp_dir.path());
        let doc = scripted_batch(&batches, &[2, 3]).await;

        let mut session = PersistenceSession::in_memory().unwrap();
        upsert_records(&mut session, &[ContentRecord::empty(1)]).unwrap();
        session
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_inserts BEFORE INSERT ON contents
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let cursor = MemoryCheckpoint::with_value(0u64);
        let result = detail_run()
            .run(&doc, &mut session, &cursor, &batches)
            .await;

        assert!(matches!(
            result,
            Err(RunError::Store(StoreError::Upsert { id: 2, .. }))
        ));
        assert_eq!(session.count().unwrap(), 1);
        assert!(session.get(2).unwrap().is_none());
        assert_eq!(cursor.get().await, Some(1));
    }

    #[tokio::test]
    async fn test_absent_cursor_starts_at_first_batch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let batches = BatchStore::new(temp_dir.path());
        let doc = scripted_batch(&batches, &[7]).await;
        let mut session = PersistenceSession::in_memory().unwrap();

        let cursor = MemoryCheckpoint::<u64>::new();
        let summary = detail_run()
            .run(&doc, &mut session, &cursor, &batches)
            .await
            .unwrap();

        assert_eq!(summary.batch, 0);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(cursor.get().await, Some(1));
    }

    #[tokio::test]
    async fn test_cursor_save_failure_fails_successful_run() {
        let temp_dir = tempfile::tempdir().unwrap();
        let batches = BatchStore::new(temp_dir.path());
        let doc = scripted_batch(&batches, &[4]).await;
        let mut session = PersistenceSession::in_memory().unwrap();

        let result = detail_run()
            .run(&doc, &mut session, &ReadOnlyCursor(0), &batches)
            .await;

        assert!(matches!(
            result,
            Err(RunError::Checkpoint(CheckpointError::Write { .. }))
        ));
        // The batch itself was committed before the cursor write.
        assert_eq!(session.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cursor_save_failure_keeps_original_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let batches = BatchStore::new(temp_dir.path());
        let doc = MockDocument::new();
        let mut session = PersistenceSession::in_memory().unwrap();

        let result = detail_run()
            .run(&doc, &mut session, &ReadOnlyCursor(3), &batches)
            .await;

        assert!(matches!(
            result,
            Err(RunError::Checkpoint(CheckpointError::BatchNotFound(3)))
        ));
    }
}
