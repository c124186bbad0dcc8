//! Detail records: content id extraction, per-field extraction and
//! normalization into [`ContentRecord`]s.

mod builder;
mod error;
mod types;

pub use builder::{parse_content_id, DetailOutcome, DetailRecordBuilder};
pub use error::{FieldIssue, RecordError};
pub use types::{ContentRecord, RawDetail};
