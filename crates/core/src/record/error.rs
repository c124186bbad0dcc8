use thiserror::Error;

use crate::dom::DomError;
use crate::normalize::FieldError;

/// Errors that reject a whole detail record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The URL does not end in a positive numeric content id.
    #[error("Invalid content identifier in {url}")]
    InvalidIdentifier { url: String },

    /// The detail page could not be loaded.
    #[error("Failed to load {url}: {source}")]
    Page {
        url: String,
        #[source]
        source: DomError,
    },
}

/// A single field that could not be extracted or normalized.
///
/// Issues never reject the record; the field is stored as null.
#[derive(Debug, Error)]
pub enum FieldIssue {
    /// Querying the page for the field failed.
    #[error("Failed to extract {field}: {source}")]
    Query {
        field: &'static str,
        #[source]
        source: DomError,
    },

    /// The field text was present but could not be normalized.
    #[error("Invalid {field}: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: FieldError,
    },
}

impl FieldIssue {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Query { field, .. } | Self::Invalid { field, .. } => field,
        }
    }

    /// Whether this is a data-quality warning rather than a failure.
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::Invalid { source, .. } if source.is_data_quality())
    }
}
