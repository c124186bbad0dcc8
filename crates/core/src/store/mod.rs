//! Idempotent SQLite persistence of content records.
//!
//! One [`PersistenceSession`] is opened per run. Detail runs write through
//! [`upsert_records`], catalog runs through [`mark_revisit`]; each call is a
//! single transaction that either fully commits or leaves the store as it was.

mod error;
mod session;
mod upsert;

pub use error::StoreError;
pub use session::PersistenceSession;
pub use upsert::{mark_revisit, upsert_records, UpsertSummary};
