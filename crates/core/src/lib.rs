pub mod checkpoint;
pub mod config;
pub mod dom;
pub mod links;
pub mod normalize;
pub mod record;
pub mod runner;
pub mod scroll;
pub mod store;
pub mod testing;

pub use checkpoint::{
    BatchStore, CheckpointError, JsonFileCheckpoint, KeyValueCheckpoint, MemoryCheckpoint,
};
pub use config::{
    load_config, load_config_from_str, validate_config, BrowserConfig, CatalogConfig,
    CheckpointConfig, Config, ConfigError, DatabaseConfig, DetailSelectors, ScrollConfig,
};
pub use dom::{ChromeDocument, Document, DomError};
pub use links::{CatalogEntry, LinkSet, Reconciliation};
pub use normalize::FieldError;
pub use record::{ContentRecord, DetailRecordBuilder, FieldIssue, RawDetail, RecordError};
pub use runner::{CatalogRun, CatalogRunSummary, DetailRun, DetailRunSummary, RunError};
pub use scroll::{ScrollOutcome, ScrollStabilizer, ScrollState, StableReason};
pub use store::{mark_revisit, upsert_records, PersistenceSession, StoreError, UpsertSummary};
