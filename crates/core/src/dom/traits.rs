//! Trait definitions for the DOM capability.

use async_trait::async_trait;

use super::error::DomError;
use crate::links::CatalogEntry;

/// A live, rendered document the crawler can query and scroll.
///
/// One `Document` is one browsing context. It is not shared between
/// concurrent operations; callers visit pages strictly one at a time.
#[async_trait]
pub trait Document: Send + Sync {
    /// Load `url` and return once the page finished loading and its network
    /// activity settled.
    async fn navigate(&self, url: &str) -> Result<(), DomError>;

    /// Current total scrollable height of the document body.
    async fn scroll_height(&self) -> Result<u64, DomError>;

    /// Scroll to the current bottom of the document.
    async fn scroll_to_bottom(&self) -> Result<(), DomError>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, DomError>;

    /// Trimmed inner text of the first element matching `selector`.
    ///
    /// Returns `Ok(None)` when nothing matches.
    async fn text(&self, selector: &str) -> Result<Option<String>, DomError>;

    /// Trimmed inner text of every element matching `selector`.
    async fn texts(&self, selector: &str) -> Result<Vec<String>, DomError>;

    /// Attribute `name` of the first element matching `selector`.
    ///
    /// Returns `Ok(None)` when nothing matches or the attribute is absent.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, DomError>;

    /// Absolute `href` of each anchor matching `anchor_selector`, paired with
    /// the text of its `title_selector` descendant, if any.
    async fn links(
        &self,
        anchor_selector: &str,
        title_selector: &str,
    ) -> Result<Vec<CatalogEntry>, DomError>;

    /// Release the browsing context. Later calls fail with [`DomError::Closed`].
    async fn close(&self) -> Result<(), DomError>;
}
