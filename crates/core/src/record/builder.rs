//! Detail-page extraction.

use tracing::{debug, warn};
use url::Url;

use crate::config::DetailSelectors;
use crate::dom::{Document, DomError};

use super::{ContentRecord, FieldIssue, RawDetail, RecordError};

/// Index of the genre inside the genre span list (the first span is the
/// content category).
const GENRE_POSITION: usize = 1;

/// Extract the content id from the last path segment of a detail URL.
///
/// The segment must be a plain ASCII integer that fits `i64`. Zero is
/// rejected; content ids are positive.
pub fn parse_content_id(url: &str) -> Result<i64, RecordError> {
    let invalid = || RecordError::InvalidIdentifier {
        url: url.to_string(),
    };

    let parsed = Url::parse(url).map_err(|_| invalid())?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .ok_or_else(invalid)?;

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match segment.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid()),
    }
}

/// Result of building one record.
#[derive(Debug)]
pub struct DetailOutcome {
    pub record: ContentRecord,
    /// Fields stored as null because extraction or normalization failed.
    pub issues: Vec<FieldIssue>,
}

/// Builds [`ContentRecord`]s from detail pages.
pub struct DetailRecordBuilder {
    selectors: DetailSelectors,
}

impl DetailRecordBuilder {
    pub fn new(selectors: DetailSelectors) -> Self {
        Self { selectors }
    }

    /// Visit `url` and extract its record.
    ///
    /// The id is validated before the page is loaded, so no record is ever
    /// built without one. Field failures are collected, not returned.
    pub async fn build(&self, doc: &dyn Document, url: &str) -> Result<DetailOutcome, RecordError> {
        let id = parse_content_id(url)?;

        doc.navigate(url).await.map_err(|source| RecordError::Page {
            url: url.to_string(),
            source,
        })?;

        let mut issues = Vec::new();
        let raw = self.extract(doc, &mut issues).await;
        let (record, invalid) = raw.normalize(id);
        issues.extend(invalid);

        for issue in &issues {
            if issue.is_data_quality() {
                warn!("Content {}: {}", id, issue);
            } else {
                warn!("Content {}: {}, storing null", id, issue);
            }
        }
        debug!("Built record for content {}: {:?}", id, record);

        Ok(DetailOutcome { record, issues })
    }

    async fn extract(&self, doc: &dyn Document, issues: &mut Vec<FieldIssue>) -> RawDetail {
        let s = &self.selectors;
        RawDetail {
            cover: collect("cover", doc.attribute(&s.cover, "content").await, issues),
            title: collect("title", doc.attribute(&s.title, "content").await, issues),
            author: collect("author", doc.attribute(&s.author, "content").await, issues),
            genre: collect(
                "genre",
                doc.texts(&s.genre)
                    .await
                    .map(|spans| spans.into_iter().nth(GENRE_POSITION)),
                issues,
            ),
            views: collect("views", doc.text(&s.views).await, issues),
            rating: collect("rating", doc.text(&s.rating).await, issues),
            schedule: collect("schedule", doc.text(&s.schedule).await, issues),
            episode_total: collect("current_ep", doc.text(&s.episode_total).await, issues),
            start_date: collect("start_date", doc.text(&s.start_date).await, issues),
        }
    }
}

fn collect(
    field: &'static str,
    result: Result<Option<String>, DomError>,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match result {
        Ok(value) => value,
        Err(source) => {
            issues.push(FieldIssue::Query { field, source });
            None
        }
    }
}
