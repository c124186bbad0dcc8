//! Error types for the DOM capability.

use thiserror::Error;

/// Errors raised by a [`Document`](super::Document) implementation.
///
/// These are capability errors: callers catch them locally, log them and
/// continue with an empty or null result.
#[derive(Debug, Error)]
pub enum DomError {
    /// Loading a URL failed or timed out.
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A selector query failed inside the page.
    #[error("Query {selector:?} failed: {reason}")]
    Query { selector: String, reason: String },

    /// A script evaluation failed.
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// Browser could not be launched or connected to.
    #[error("Failed to start browser session: {0}")]
    Session(String),

    /// A DevTools protocol call failed.
    #[error("DevTools error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// The page was closed; no further operations are possible.
    #[error("Page is closed")]
    Closed,
}

impl DomError {
    pub fn query(selector: &str, reason: impl Into<String>) -> Self {
        Self::Query {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    pub fn navigation(url: &str, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
