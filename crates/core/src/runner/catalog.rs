//! Catalog run: scroll the feed and collect new detail links.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::checkpoint::{BatchStore, KeyValueCheckpoint};
use crate::config::{CatalogConfig, ScrollConfig};
use crate::dom::Document;
use crate::links::{filter_entries, reconcile, LinkSet};
use crate::record::parse_content_id;
use crate::scroll::{stabilize, ScrollOutcome, ScrollState};
use crate::store::{mark_revisit, PersistenceSession};

use super::{CatalogRunSummary, RunError};

/// Discovers detail links on the catalog feed.
pub struct CatalogRun {
    catalog: CatalogConfig,
    scroll: ScrollConfig,
}

impl CatalogRun {
    pub fn new(catalog: CatalogConfig, scroll: ScrollConfig) -> Self {
        Self { catalog, scroll }
    }

    /// Scroll the feed, reconcile its links and hand fresh ones to the next
    /// detail batch.
    ///
    /// If scrolling errors out nothing is extracted and nothing is written.
    /// Otherwise every discovered content is flagged for revisit, fresh links
    /// are written as a new batch and the link set is saved, in that order.
    pub async fn run(
        &self,
        doc: &dyn Document,
        session: &mut PersistenceSession,
        link_checkpoint: &dyn KeyValueCheckpoint<LinkSet>,
        batches: &BatchStore,
    ) -> Result<CatalogRunSummary, RunError> {
        let started_at = Utc::now();
        let mut links = link_checkpoint.load().await?.unwrap_or_default();
        info!(
            "Starting catalog run on {} ({} known links)",
            self.catalog.root_url,
            links.len()
        );

        let outcome = match doc.navigate(&self.catalog.root_url).await {
            Ok(()) => stabilize(doc, &self.scroll, &self.catalog.control_selector).await,
            Err(e) => {
                error!("Failed to load catalog: {}", e);
                ScrollOutcome {
                    state: ScrollState::Errored,
                    cycles: 0,
                    scrolls: 0,
                    last_control_count: None,
                }
            }
        };

        if !outcome.is_stable() {
            warn!("Catalog did not stabilize, skipping extraction");
            return Ok(CatalogRunSummary {
                outcome,
                discovered: 0,
                fresh: 0,
                total_links: links.len(),
                revisits: 0,
                batch: None,
                started_at,
                finished_at: Utc::now(),
            });
        }
        info!("Catalog stabilized: {:?}", outcome.state);

        let entries = match doc
            .links(&self.catalog.extraction_selector, &self.catalog.title_selector)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to extract catalog links: {}", e);
                Vec::new()
            }
        };
        let candidates = filter_entries(entries, &self.catalog.omnibus_marker);
        let reconciliation = reconcile(&mut links, candidates, &self.catalog.excluded_urls);

        let ids: Vec<i64> = reconciliation
            .discovered
            .iter()
            .filter_map(|url| parse_content_id(url).ok())
            .collect();
        mark_revisit(session, &ids)?;

        let batch = if reconciliation.fresh.is_empty() {
            None
        } else {
            let index = batches.next_index().await?;
            batches.store(index, &reconciliation.fresh).await?;
            Some(index)
        };

        link_checkpoint.save(&links).await?;

        info!(
            "Catalog run finished: {} discovered, {} fresh, {} total",
            reconciliation.discovered.len(),
            reconciliation.fresh.len(),
            links.len()
        );

        Ok(CatalogRunSummary {
            outcome,
            discovered: reconciliation.discovered.len(),
            fresh: reconciliation.fresh.len(),
            total_links: links.len(),
            revisits: ids.len(),
            batch,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
