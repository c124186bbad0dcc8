//! Types for catalog link discovery.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// An anchor found on the catalog feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Absolute detail-page URL.
    pub href: String,
    /// Title text shown on the card, if the card has one.
    #[serde(default)]
    pub title: Option<String>,
}

impl CatalogEntry {
    pub fn new(href: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            href: href.into(),
            title: title.map(str::to_string),
        }
    }
}

/// Every detail-page URL discovered across all runs.
///
/// Deduplicated by exact string equality; insertion order is kept so the
/// persisted form is stable between runs. The set only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LinkSet {
    urls: Vec<String>,
    index: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a URL. Returns `true` if it was not already present.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.index.contains(url) {
            return false;
        }
        self.index.insert(url.to_string());
        self.urls.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn is_superset(&self, other: &LinkSet) -> bool {
        other.iter().all(|url| self.contains(url))
    }
}

impl From<Vec<String>> for LinkSet {
    fn from(urls: Vec<String>) -> Self {
        let mut set = LinkSet::new();
        for url in &urls {
            set.insert(url);
        }
        set
    }
}

impl From<LinkSet> for Vec<String> {
    fn from(set: LinkSet) -> Self {
        set.urls
    }
}

/// Result of merging one catalog run's links into the accumulated set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Every distinct link seen this run, in discovery order.
    pub discovered: Vec<String>,
    /// Links not present in the accumulated set before this run.
    pub fresh: Vec<String>,
}
