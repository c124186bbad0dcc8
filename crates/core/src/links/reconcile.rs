//! Filtering and reconciliation of discovered catalog links.

use std::collections::HashSet;

use tracing::debug;

use super::{CatalogEntry, LinkSet, Reconciliation};

/// Keep entries that are individual content items.
///
/// Cards without a title are layout chrome, and cards whose title contains
/// `omnibus_marker` are compilations of other items.
pub fn filter_entries(entries: Vec<CatalogEntry>, omnibus_marker: &str) -> Vec<String> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.as_deref().map(str::trim).unwrap_or_default();
            if title.is_empty() {
                debug!("Skipping untitled entry {}", entry.href);
                return None;
            }
            if !omnibus_marker.is_empty() && title.contains(omnibus_marker) {
                debug!("Skipping compilation {:?} ({})", title, entry.href);
                return None;
            }
            Some(entry.href)
        })
        .collect()
}

/// Merge newly extracted links into the accumulated set.
///
/// `excluded` URLs are dropped first. The accumulated set is updated in place
/// and never shrinks.
pub fn reconcile(
    accumulated: &mut LinkSet,
    candidates: Vec<String>,
    excluded: &[String],
) -> Reconciliation {
    let mut seen = HashSet::new();
    let mut result = Reconciliation::default();

    for url in candidates {
        if excluded.iter().any(|e| *e == url) {
            continue;
        }
        if !seen.insert(url.clone()) {
            continue;
        }
        if accumulated.insert(&url) {
            result.fresh.push(url.clone());
        }
        result.discovered.push(url);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LEGAL_NOTICE_URL;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_entries_drops_omnibus_and_untitled() {
        let entries = vec![
            CatalogEntry::new("https://p/content/1", Some("Hero Returns")),
            CatalogEntry::new("https://p/content/2", Some("Hero Returns [단행본]")),
            CatalogEntry::new("https://p/content/3", None),
            CatalogEntry::new("https://p/content/4", Some("   ")),
            CatalogEntry::new("https://p/content/5", Some("Moonlight")),
        ];
        let kept = filter_entries(entries, "단행");
        assert_eq!(kept, urls(&["https://p/content/1", "https://p/content/5"]));
    }

    #[test]
    fn test_reconcile_reports_fresh_and_discovered() {
        let mut set = LinkSet::from(urls(&["https://p/content/1"]));
        let result = reconcile(
            &mut set,
            urls(&["https://p/content/1", "https://p/content/2", "https://p/content/2"]),
            &[],
        );
        assert_eq!(result.discovered, urls(&["https://p/content/1", "https://p/content/2"]));
        assert_eq!(result.fresh, urls(&["https://p/content/2"]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_reconcile_filters_legal_notice() {
        let mut set = LinkSet::new();
        let result = reconcile(
            &mut set,
            urls(&[LEGAL_NOTICE_URL, "https://p/content/9"]),
            &[LEGAL_NOTICE_URL.to_string()],
        );
        assert_eq!(result.discovered, urls(&["https://p/content/9"]));
        assert!(!set.contains(LEGAL_NOTICE_URL));
    }

    #[test]
    fn test_reconcile_is_monotonic_across_runs() {
        let mut set = LinkSet::new();
        reconcile(&mut set, urls(&["a", "b", "c"]), &[]);
        let before = set.clone();

        let second = reconcile(&mut set, urls(&["b", "c"]), &[]);
        assert!(second.fresh.is_empty());
        assert_eq!(set.len(), before.len());

        reconcile(&mut set, urls(&["d"]), &[]);
        assert!(set.is_superset(&before));
        assert_eq!(set.len(), 4);
    }
}
