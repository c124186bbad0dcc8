//! Transactional writes to the content store.

use rusqlite::params;
use serde::Serialize;
use tracing::{debug, info};

use crate::record::ContentRecord;

use super::{PersistenceSession, StoreError};

const UPSERT_SQL: &str = r#"
INSERT INTO contents (id, title, author, cover, genre, views, rating, currentEp, schedule, startDate)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT(id) DO UPDATE SET
    title = excluded.title,
    author = excluded.author,
    cover = excluded.cover,
    genre = excluded.genre,
    views = excluded.views,
    rating = excluded.rating,
    currentEp = excluded.currentEp,
    schedule = excluded.schedule,
    startDate = excluded.startDate
"#;

const REVISIT_SQL: &str = r#"
INSERT INTO contents (id, revisit) VALUES (?1, 1)
ON CONFLICT(id) DO UPDATE SET revisit = 1
"#;

/// Outcome of a committed upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Insert or overwrite `records` in one transaction.
///
/// Every detail column is overwritten, nulls included; `revisit` is left as
/// is. If any record fails, nothing from the batch is kept.
pub fn upsert_records(
    session: &mut PersistenceSession,
    records: &[ContentRecord],
) -> Result<UpsertSummary, StoreError> {
    let tx = session.conn.transaction()?;
    let mut summary = UpsertSummary::default();
    {
        let mut exists = tx.prepare_cached("SELECT 1 FROM contents WHERE id = ?1")?;
        let mut upsert = tx.prepare_cached(UPSERT_SQL)?;

        for record in records {
            let views = record
                .views
                .map(i64::try_from)
                .transpose()
                .map_err(|_| StoreError::OutOfRange {
                    id: record.id,
                    field: "views",
                })?;
            let known = exists.exists(params![record.id])?;

            upsert
                .execute(params![
                    record.id,
                    record.title,
                    record.author,
                    record.cover,
                    record.genre,
                    views,
                    record.rating,
                    record.current_ep,
                    record.schedule,
                    record.start_date,
                ])
                .map_err(|e| StoreError::Upsert {
                    id: record.id,
                    reason: e.to_string(),
                })?;

            if known {
                summary.updated += 1;
            } else {
                summary.inserted += 1;
            }
            debug!("Upserted content {}", record.id);
        }
    }
    tx.commit()?;

    info!(
        "Stored {} records ({} new, {} updated)",
        records.len(),
        summary.inserted,
        summary.updated
    );
    Ok(summary)
}

/// Flag `ids` for revisit in one transaction.
///
/// Unknown ids get a row holding only the flag; detail columns of known ids
/// are never touched.
pub fn mark_revisit(session: &mut PersistenceSession, ids: &[i64]) -> Result<(), StoreError> {
    let tx = session.conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(REVISIT_SQL)?;
        for id in ids {
            stmt.execute(params![id]).map_err(|e| StoreError::Upsert {
                id: *id,
                reason: e.to_string(),
            })?;
        }
    }
    tx.commit()?;

    debug!("Flagged {} contents for revisit", ids.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, title: &str) -> ContentRecord {
        ContentRecord {
            title: Some(title.to_string()),
            author: Some("Author".to_string()),
            views: Some(30_000),
            rating: Some(5),
            start_date: Some("2024-03-15".to_string()),
            current_ep: Some(152),
            ..ContentRecord::empty(id)
        }
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let mut session = PersistenceSession::in_memory().unwrap();

        let summary = upsert_records(&mut session, &[record(1, "A"), record(2, "B")]).unwrap();
        assert_eq!(summary, UpsertSummary { inserted: 2, updated: 0 });

        let summary = upsert_records(&mut session, &[record(1, "A2")]).unwrap();
        assert_eq!(summary, UpsertSummary { inserted: 0, updated: 1 });

        assert_eq!(session.count().unwrap(), 2);
        assert_eq!(session.get(1).unwrap().unwrap().title.as_deref(), Some("A2"));
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut session = PersistenceSession::in_memory().unwrap();
        let batch = vec![record(1, "A"), record(2, "B")];

        upsert_records(&mut session, &batch).unwrap();
        let first: Vec<_> = [1, 2].iter().map(|id| session.get(*id).unwrap()).collect();

        upsert_records(&mut session, &batch).unwrap();
        let second: Vec<_> = [1, 2].iter().map(|id| session.get(*id).unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(session.count().unwrap(), 2);
    }

    #[test]
    fn test_upsert_overwrites_with_nulls() {
        let mut session = PersistenceSession::in_memory().unwrap();
        upsert_records(&mut session, &[record(1, "A")]).unwrap();
        upsert_records(&mut session, &[ContentRecord::empty(1)]).unwrap();

        let stored = session.get(1).unwrap().unwrap();
        assert_eq!(stored, ContentRecord::empty(1));
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut session = PersistenceSession::in_memory().unwrap();
        upsert_records(&mut session, &[record(1, "A")]).unwrap();

        let bad = ContentRecord {
            rating: Some(7),
            ..record(3, "C")
        };
        let result = upsert_records(&mut session, &[record(1, "A2"), record(2, "B"), bad]);

        assert!(matches!(result, Err(StoreError::Upsert { id: 3, .. })));
        assert_eq!(session.count().unwrap(), 1);
        assert_eq!(session.get(1).unwrap().unwrap().title.as_deref(), Some("A"));
        assert!(session.get(2).unwrap().is_none());
    }

    #[test]
    fn test_mark_revisit_never_touches_details() {
        let mut session = PersistenceSession::in_memory().unwrap();
        upsert_records(&mut session, &[record(1, "A")]).unwrap();

        mark_revisit(&mut session, &[1, 2]).unwrap();

        let known = session.get(1).unwrap().unwrap();
        assert!(known.revisit);
        assert_eq!(known.title.as_deref(), Some("A"));
        assert_eq!(known.views, Some(30_000));

        let placeholder = session.get(2).unwrap().unwrap();
        assert!(placeholder.revisit);
        assert_eq!(placeholder.title, None);
        assert_eq!(session.revisit_count().unwrap(), 2);
    }

    #[test]
    fn test_upsert_keeps_revisit_flag() {
        let mut session = PersistenceSession::in_memory().unwrap();
        mark_revisit(&mut session, &[5]).unwrap();
        upsert_records(&mut session, &[record(5, "E")]).unwrap();

        let stored = session.get(5).unwrap().unwrap();
        assert!(stored.revisit);
        assert_eq!(stored.title.as_deref(), Some("E"));
    }
}
