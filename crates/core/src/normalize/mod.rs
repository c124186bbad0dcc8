//! Field normalization: locale-formatted page text into typed values.
//!
//! Every parser is pure and takes text that is known to be present. Absence
//! of a field is the caller's concern; a parser only answers "what value does
//! this text hold", or why it holds none.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

/// Unit marker for ×10,000.
const MAN: char = '만';
/// Unit marker for ×100,000,000.
const EOK: char = '억';

/// Marker that an episode label holds the total episode count.
const EPISODE_TOTAL_MARKER: &str = "전체";

static COMPACT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{2})$").expect("valid date pattern"));

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits pattern"));

/// Why a present field could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Text does not hold a value of the expected shape.
    #[error("Malformed {field} {raw:?}: {reason}")]
    Malformed {
        field: &'static str,
        raw: String,
        reason: String,
    },

    /// Date text is not `YY.MM.DD`. A data-quality warning, never fatal.
    #[error("Unexpected date format {raw:?}, expected YY.MM.DD")]
    UnexpectedDateFormat { raw: String },
}

impl FieldError {
    fn malformed(field: &'static str, raw: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this is a data-quality warning rather than a parse failure.
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::UnexpectedDateFormat { .. })
    }
}

/// Parse a view count such as `"1,234"`, `"3만"` or `"2억"`.
///
/// Grouping commas are stripped, a trailing `만` scales by 10,000 and a
/// trailing `억` by 100,000,000. The result is rounded to the nearest integer.
pub fn parse_scaled_count(text: &str) -> Result<u64, FieldError> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();

    let (number, multiplier) = if let Some(rest) = cleaned.strip_suffix(EOK) {
        (rest.trim_end(), 100_000_000.0)
    } else if let Some(rest) = cleaned.strip_suffix(MAN) {
        (rest.trim_end(), 10_000.0)
    } else {
        (cleaned, 1.0)
    };

    let value: f64 = number
        .parse()
        .map_err(|_| FieldError::malformed("views", text, "not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(FieldError::malformed("views", text, "out of range"));
    }

    // `i64::MAX as f64` rounds up to 2^63, which no stored count may reach.
    let scaled = (value * multiplier).round();
    if scaled >= i64::MAX as f64 {
        return Err(FieldError::malformed("views", text, "out of range"));
    }

    Ok(scaled as u64)
}

/// Convert a 0–10 rating such as `"9.8"` to the 0–5 scale.
pub fn parse_halved_rating(text: &str) -> Result<u8, FieldError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| FieldError::malformed("rating", text, "not a number"))?;
    if !(0.0..=10.0).contains(&value) {
        return Err(FieldError::malformed("rating", text, "outside 0-10"));
    }

    Ok((value / 2.0).round() as u8)
}

/// Expand a compact `YY.MM.DD` date into ISO `YYYY-MM-DD`.
///
/// Two-digit years map to 2000–2099 only.
pub fn parse_compact_date(text: &str) -> Result<String, FieldError> {
    let unexpected = || FieldError::UnexpectedDateFormat {
        raw: text.to_string(),
    };

    let caps = COMPACT_DATE.captures(text).ok_or_else(unexpected)?;
    let year: i32 = caps[1].parse().map_err(|_| unexpected())?;
    let month: u32 = caps[2].parse().map_err(|_| unexpected())?;
    let day: u32 = caps[3].parse().map_err(|_| unexpected())?;

    let date = NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(unexpected)?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Publication schedule: the last two characters of the schedule label.
///
/// Labels shorter than two characters are kept as is.
pub fn schedule_suffix(text: &str) -> String {
    let text = text.trim();
    let count = text.chars().count();
    if count >= 2 {
        text.chars().skip(count - 2).collect()
    } else {
        text.to_string()
    }
}

/// Total episode count from a label such as `"전체 152"`.
pub fn parse_episode_total(text: &str) -> Result<u32, FieldError> {
    if !text.contains(EPISODE_TOTAL_MARKER) {
        return Err(FieldError::malformed(
            "current_ep",
            text,
            "not an episode total label",
        ));
    }
    let digits = DIGITS
        .find(text)
        .ok_or_else(|| FieldError::malformed("current_ep", text, "no digits"))?;
    digits
        .as_str()
        .parse()
        .map_err(|_| FieldError::malformed("current_ep", text, "episode count too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_count_plain_and_grouped() {
        assert_eq!(parse_scaled_count("1,234"), Ok(1234));
        assert_eq!(parse_scaled_count("987"), Ok(987));
        assert_eq!(parse_scaled_count(" 12,345,678 "), Ok(12_345_678));
    }

    #[test]
    fn test_scaled_count_units() {
        assert_eq!(parse_scaled_count("3만"), Ok(30_000));
        assert_eq!(parse_scaled_count("2억"), Ok(200_000_000));
        assert_eq!(parse_scaled_count("1.5만"), Ok(15_000));
        assert_eq!(parse_scaled_count("1,234.5만"), Ok(12_345_000));
        assert_eq!(parse_scaled_count("2.3 억"), Ok(230_000_000));
    }

    #[test]
    fn test_scaled_count_rounds() {
        assert_eq!(parse_scaled_count("0.5"), Ok(1));
        assert_eq!(parse_scaled_count("12.4"), Ok(12));
    }

    #[test]
    fn test_scaled_count_rejects_non_numeric() {
        assert!(matches!(
            parse_scaled_count("많음"),
            Err(FieldError::Malformed { field: "views", .. })
        ));
        assert!(parse_scaled_count("").is_err());
        assert!(parse_scaled_count("만").is_err());
        assert!(parse_scaled_count("-3만").is_err());
        assert!(parse_scaled_count("NaN").is_err());
        assert!(parse_scaled_count("1e30억").is_err());
        assert!(parse_scaled_count("9,223,372,036,854,775,808").is_err());
        assert!(parse_scaled_count("92233720368547.75808억").is_err());
    }

    #[test]
    fn test_scaled_count_largest_storable() {
        // Largest f64 below 2^63.
        assert_eq!(
            parse_scaled_count("9223372036854774784"),
            Ok(9_223_372_036_854_774_784)
        );
    }

    #[test]
    fn test_halved_rating() {
        assert_eq!(parse_halved_rating("9.8"), Ok(5));
        assert_eq!(parse_halved_rating("0"), Ok(0));
        assert_eq!(parse_halved_rating("7.0"), Ok(4));
        assert_eq!(parse_halved_rating("10"), Ok(5));
        assert_eq!(parse_halved_rating("4.4"), Ok(2));
    }

    #[test]
    fn test_halved_rating_rejects() {
        assert!(parse_halved_rating("abc").is_err());
        assert!(parse_halved_rating("11").is_err());
        assert!(parse_halved_rating("-1").is_err());
    }

    #[test]
    fn test_compact_date() {
        assert_eq!(parse_compact_date("24.03.15"), Ok("2024-03-15".to_string()));
        assert_eq!(parse_compact_date("00.01.01"), Ok("2000-01-01".to_string()));
        assert_eq!(parse_compact_date("99.12.31"), Ok("2099-12-31".to_string()));
    }

    #[test]
    fn test_compact_date_wrong_pattern_is_data_quality_warning() {
        let err = parse_compact_date("2024-03-15").unwrap_err();
        assert!(err.is_data_quality());
        assert_eq!(
            err,
            FieldError::UnexpectedDateFormat {
                raw: "2024-03-15".to_string()
            }
        );

        for raw in ["24.3.15", "24.03.15 ", "24.03.15.", "ab.cd.ef", "2024.03.15", ""] {
            assert!(
                matches!(
                    parse_compact_date(raw),
                    Err(FieldError::UnexpectedDateFormat { .. })
                ),
                "expected warning for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_compact_date_impossible_calendar_date() {
        assert!(parse_compact_date("24.13.01").is_err());
        assert!(parse_compact_date("23.02.29").is_err());
        assert_eq!(parse_compact_date("24.02.29"), Ok("2024-02-29".to_string()));
    }

    #[test]
    fn test_schedule_suffix() {
        assert_eq!(schedule_suffix("매주 월요일 연재"), "연재");
        assert_eq!(schedule_suffix("완결"), "완결");
        assert_eq!(schedule_suffix("월"), "월");
        assert_eq!(schedule_suffix("  토요 "), "토요");
    }

    #[test]
    fn test_episode_total() {
        assert_eq!(parse_episode_total("전체 152"), Ok(152));
        assert_eq!(parse_episode_total("전체(37)"), Ok(37));
        assert!(parse_episode_total("152화").is_err());
        assert!(parse_episode_total("전체").is_err());
    }
}
