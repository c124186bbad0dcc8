//! The two crawl runs.
//!
//! A [`CatalogRun`] scrolls the feed and writes newly discovered links as a
//! batch; a [`DetailRun`] later consumes one batch per invocation, in cursor
//! order.

mod catalog;
mod detail;
mod types;

pub use catalog::CatalogRun;
pub use detail::DetailRun;
pub use types::{CatalogRunSummary, DetailRunSummary, RunError};
