//! Mock document for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::dom::{Document, DomError};
use crate::links::CatalogEntry;

/// Content of one scripted page.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    texts: HashMap<String, Vec<String>>,
    attributes: HashMap<(String, String), String>,
    links: Vec<CatalogEntry>,
    failing_selectors: HashSet<String>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single element matching `selector` with inner text `text`.
    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts
            .insert(selector.to_string(), vec![text.to_string()]);
        self
    }

    /// Several elements matching `selector`, in document order.
    pub fn with_texts(mut self, selector: &str, texts: &[&str]) -> Self {
        self.texts.insert(
            selector.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_attribute(mut self, selector: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    /// Anchors returned by [`Document::links`].
    pub fn with_links(mut self, links: Vec<CatalogEntry>) -> Self {
        self.links = links;
        self
    }

    /// Queries against `selector` fail with [`DomError::Query`].
    pub fn with_failing_selector(mut self, selector: &str) -> Self {
        self.failing_selectors.insert(selector.to_string());
        self
    }

    fn check(&self, selector: &str) -> Result<(), DomError> {
        if self.failing_selectors.contains(selector) {
            Err(DomError::query(selector, "simulated query failure"))
        } else {
            Ok(())
        }
    }
}

/// A scripted sequence of values; the last one repeats once exhausted.
#[derive(Debug, Clone)]
struct Script<T: Clone> {
    queue: VecDeque<T>,
    last: Option<T>,
}

impl<T: Clone> Script<T> {
    fn new(values: Vec<T>) -> Self {
        Self {
            queue: values.into(),
            last: None,
        }
    }

    fn next(&mut self) -> Option<T> {
        match self.queue.pop_front() {
            Some(value) => {
                self.last = Some(value.clone());
                Some(value)
            }
            None => self.last.clone(),
        }
    }
}

/// Mock implementation of the [`Document`] trait.
///
/// Provides controllable behavior for testing:
/// - Scripted pages keyed by URL
/// - Scripted scroll heights and control element counts
/// - Simulated navigation and query failures
/// - Recorded navigations and scrolls for assertions
///
/// # Example
///
/// ```rust,ignore
/// use crawler_core::testing::{MockDocument, MockPage};
///
/// let doc = MockDocument::new();
/// doc.add_page("https://page.kakao.com/content/42", MockPage::new()
///     .with_attribute(r#"meta[property="og:title"]"#, "content", "Moonlight")).await;
/// doc.set_control_counts("a.badge", vec![Some(5), Some(8), Some(8)]).await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDocument {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    current: Arc<RwLock<Option<String>>>,
    navigation_failures: Arc<RwLock<HashSet<String>>>,
    navigations: Arc<RwLock<Vec<String>>>,
    heights: Arc<RwLock<Option<Script<u64>>>>,
    control_counts: Arc<RwLock<HashMap<String, Script<Option<usize>>>>>,
    scrolls: Arc<RwLock<u32>>,
    closed: Arc<RwLock<bool>>,
}

impl MockDocument {
    /// Height reported when no heights were scripted.
    pub const DEFAULT_HEIGHT: u64 = 2000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Register the page served for `url`.
    pub async fn add_page(&self, url: &str, page: MockPage) {
        self.pages.write().await.insert(url.to_string(), page);
    }

    /// Make navigation to `url` fail.
    pub async fn fail_navigation(&self, url: &str) {
        self.navigation_failures
            .write()
            .await
            .insert(url.to_string());
    }

    /// Scroll heights returned by successive `scroll_height` calls.
    pub async fn set_heights(&self, heights: Vec<u64>) {
        *self.heights.write().await = Some(Script::new(heights));
    }

    /// Counts returned by successive `count(selector)` calls; `None` fails the call.
    pub async fn set_control_counts(&self, selector: &str, counts: Vec<Option<usize>>) {
        self.control_counts
            .write()
            .await
            .insert(selector.to_string(), Script::new(counts));
    }

    pub async fn recorded_navigations(&self) -> Vec<String> {
        self.navigations.read().await.clone()
    }

    pub async fn scroll_count(&self) -> u32 {
        *self.scrolls.read().await
    }

    pub async fn is_closed(&self) -> bool {
        *self.closed.read().await
    }

    async fn ensure_open(&self) -> Result<(), DomError> {
        if *self.closed.read().await {
            Err(DomError::Closed)
        } else {
            Ok(())
        }
    }

    async fn current_page(&self) -> Result<MockPage, DomError> {
        self.ensure_open().await?;
        let current = self.current.read().await.clone();
        let pages = self.pages.read().await;
        Ok(current
            .and_then(|url| pages.get(&url).cloned())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Document for MockDocument {
    async fn navigate(&self, url: &str) -> Result<(), DomError> {
        self.ensure_open().await?;
        self.navigations.write().await.push(url.to_string());
        if self.navigation_failures.read().await.contains(url) {
            return Err(DomError::navigation(url, "simulated navigation timeout"));
        }
        *self.current.write().await = Some(url.to_string());
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64, DomError> {
        self.ensure_open().await?;
        let mut heights = self.heights.write().await;
        Ok(heights
            .as_mut()
            .and_then(Script::next)
            .unwrap_or(Self::DEFAULT_HEIGHT))
    }

    async fn scroll_to_bottom(&self) -> Result<(), DomError> {
        self.ensure_open().await?;
        *self.scrolls.write().await += 1;
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize, DomError> {
        self.ensure_open().await?;
        let mut counts = self.control_counts.write().await;
        if let Some(script) = counts.get_mut(selector) {
            return script
                .next()
                .flatten()
                .ok_or_else(|| DomError::query(selector, "simulated count failure"));
        }
        drop(counts);

        let page = self.current_page().await?;
        page.check(selector)?;
        Ok(page.texts.get(selector).map(Vec::len).unwrap_or(0))
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, DomError> {
        let page = self.current_page().await?;
        page.check(selector)?;
        Ok(page
            .texts
            .get(selector)
            .and_then(|texts| texts.first())
            .map(|t| t.trim().to_string()))
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, DomError> {
        let page = self.current_page().await?;
        page.check(selector)?;
        Ok(page
            .texts
            .get(selector)
            .map(|texts| texts.iter().map(|t| t.trim().to_string()).collect())
            .unwrap_or_default())
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, DomError> {
        let page = self.current_page().await?;
        page.check(selector)?;
        Ok(page
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned())
    }

    async fn links(
        &self,
        anchor_selector: &str,
        _title_selector: &str,
    ) -> Result<Vec<CatalogEntry>, DomError> {
        let page = self.current_page().await?;
        page.check(anchor_selector)?;
        Ok(page.links.clone())
    }

    async fn close(&self) -> Result<(), DomError> {
        *self.closed.write().await = true;
        Ok(())
    }
}
