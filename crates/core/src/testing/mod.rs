//! Testing utilities: a scripted [`Document`](crate::dom::Document) and
//! fixtures for building catalog and detail pages.
//!
//! # Example
//!
//! ```rust,ignore
//! use crawler_core::testing::{fixtures, MockDocument};
//!
//! let doc = MockDocument::new();
//! let url = fixtures::detail_url(42);
//! doc.add_page(&url, fixtures::detail_page("Moonlight")).await;
//! ```

mod mock_document;

pub use mock_document::{MockDocument, MockPage};

/// Test fixtures and helper functions.
pub mod fixtures {
    use super::MockPage;
    use crate::config::DetailSelectors;
    use crate::links::CatalogEntry;

    /// Base of detail-page URLs used by fixtures.
    pub const CONTENT_BASE: &str = "https://page.kakao.com/content";

    /// Detail-page URL for content `id`.
    pub fn detail_url(id: i64) -> String {
        format!("{}/{}", CONTENT_BASE, id)
    }

    /// A catalog card linking to content `id`.
    pub fn catalog_entry(id: i64, title: &str) -> CatalogEntry {
        CatalogEntry::new(detail_url(id), Some(title))
    }

    /// A detail page where every field is present and well formed.
    ///
    /// Normalizes to views 30,000, rating 5, schedule "연재",
    /// start date 2024-03-15 and 152 episodes.
    pub fn detail_page(title: &str) -> MockPage {
        let s = DetailSelectors::default();
        MockPage::new()
            .with_attribute(&s.cover, "content", "https://img.example.com/cover.jpg")
            .with_attribute(&s.title, "content", title)
            .with_attribute(&s.author, "content", "Author")
            .with_texts(&s.genre, &["웹툰", "판타지"])
            .with_text(&s.views, "3만")
            .with_text(&s.rating, "9.8")
            .with_text(&s.schedule, "매주 월요일 연재")
            .with_text(&s.episode_total, "전체 152")
            .with_text(&s.start_date, "24.03.15")
    }

    /// A detail page with only a title.
    pub fn sparse_detail_page(title: &str) -> MockPage {
        let s = DetailSelectors::default();
        MockPage::new().with_attribute(&s.title, "content", title)
    }
}
