//! Catalog link discovery: entry filtering and the accumulated link set.
//!
//! Links flow in two steps. [`filter_entries`] runs at extraction time and
//! drops cards that are not individual items. [`reconcile`] then unions the
//! batch into the persistent [`LinkSet`], reporting which links are new.

mod reconcile;
mod types;

pub use reconcile::{filter_entries, reconcile};
pub use types::{CatalogEntry, LinkSet, Reconciliation};
