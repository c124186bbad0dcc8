use serde::{Deserialize, Serialize};

use crate::normalize::{
    parse_compact_date, parse_episode_total, parse_halved_rating, parse_scaled_count,
    schedule_suffix, FieldError,
};

use super::FieldIssue;

/// A normalized content record, one row of the `contents` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub genre: Option<String>,
    pub views: Option<u64>,
    /// 0–5 scale.
    pub rating: Option<u8>,
    pub schedule: Option<String>,
    /// `YYYY-MM-DD`.
    pub start_date: Option<String>,
    pub current_ep: Option<u32>,
    /// Maintained by the catalog run, never by detail extraction.
    #[serde(default)]
    pub revisit: bool,
}

impl ContentRecord {
    /// A record with only its id set.
    pub fn empty(id: i64) -> Self {
        Self {
            id,
            title: None,
            author: None,
            cover: None,
            genre: None,
            views: None,
            rating: None,
            schedule: None,
            start_date: None,
            current_ep: None,
            revisit: false,
        }
    }
}

/// Field text as read from a detail page, before normalization.
///
/// `None` means the element was absent (or empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDetail {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub genre: Option<String>,
    pub views: Option<String>,
    pub rating: Option<String>,
    pub schedule: Option<String>,
    pub episode_total: Option<String>,
    pub start_date: Option<String>,
}

impl RawDetail {
    /// Normalize every field independently.
    ///
    /// A field that fails to normalize is stored as `None` and reported in the
    /// returned issues; it never affects the other fields.
    pub fn normalize(self, id: i64) -> (ContentRecord, Vec<FieldIssue>) {
        let mut issues = Vec::new();
        let mut record = ContentRecord::empty(id);

        record.title = non_empty(self.title);
        record.author = non_empty(self.author);
        record.cover = non_empty(self.cover);
        record.genre = non_empty(self.genre);
        record.schedule = non_empty(self.schedule).map(|s| schedule_suffix(&s));
        record.views = parse_field("views", self.views, parse_scaled_count, &mut issues);
        record.rating = parse_field("rating", self.rating, parse_halved_rating, &mut issues);
        record.current_ep = parse_field(
            "current_ep",
            self.episode_total,
            parse_episode_total,
            &mut issues,
        );
        record.start_date =
            parse_field("start_date", self.start_date, parse_compact_date, &mut issues);

        (record, issues)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_field<T>(
    field: &'static str,
    raw: Option<String>,
    parse: impl Fn(&str) -> Result<T, FieldError>,
    issues: &mut Vec<FieldIssue>,
) -> Option<T> {
    let raw = non_empty(raw)?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(source) => {
            issues.push(FieldIssue::Invalid { field, source });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_raw() -> RawDetail {
        RawDetail {
            title: Some("Moonlight".to_string()),
            author: Some("Author".to_string()),
            cover: Some("https://img.example.com/c.jpg".to_string()),
            genre: Some("판타지".to_string()),
            views: Some("1,234".to_string()),
            rating: Some("9.8".to_string()),
            schedule: Some("매주 월요일 연재".to_string()),
            episode_total: Some("전체 152".to_string()),
            start_date: Some("24.03.15".to_string()),
        }
    }

    #[test]
    fn test_normalize_full_detail() {
        let (record, issues) = full_raw().normalize(42);
        assert!(issues.is_empty());
        assert_eq!(record.id, 42);
        assert_eq!(record.title.as_deref(), Some("Moonlight"));
        assert_eq!(record.views, Some(1234));
        assert_eq!(record.rating, Some(5));
        assert_eq!(record.schedule.as_deref(), Some("연재"));
        assert_eq!(record.current_ep, Some(152));
        assert_eq!(record.start_date.as_deref(), Some("2024-03-15"));
        assert!(!record.revisit);
    }

    #[test]
    fn test_absent_fields_are_not_issues() {
        let (record, issues) = RawDetail::default().normalize(7);
        assert!(issues.is_empty());
        assert_eq!(record, ContentRecord::empty(7));
    }

    #[test]
    fn test_malformed_field_is_isolated() {
        let raw = RawDetail {
            views: Some("many".to_string()),
            start_date: Some("2024-03-15".to_string()),
            ..full_raw()
        };
        let (record, issues) = raw.normalize(42);

        assert_eq!(record.views, None);
        assert_eq!(record.start_date, None);
        assert_eq!(record.rating, Some(5));
        assert_eq!(record.title.as_deref(), Some("Moonlight"));

        let fields: Vec<_> = issues.iter().map(FieldIssue::field).collect();
        assert_eq!(fields, vec!["views", "start_date"]);
        assert!(!issues[0].is_data_quality());
        assert!(issues[1].is_data_quality());
    }

    #[test]
    fn test_blank_text_counts_as_absent() {
        let raw = RawDetail {
            title: Some("   ".to_string()),
            views: Some("".to_string()),
            ..RawDetail::default()
        };
        let (record, issues) = raw.normalize(1);
        assert!(issues.is_empty());
        assert_eq!(record.title, None);
        assert_eq!(record.views, None);
    }
}
