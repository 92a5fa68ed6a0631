//! Error types for the series scraper
//!
//! This module defines all error types used throughout the library, plus the
//! per-item outcome type that extraction loops collect instead of bailing out.

use thiserror::Error;

/// Error type for series scraper operations
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed (connection, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Requested resource was not found (HTTP 404)
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited while fetching {0}")]
    RateLimited(String),

    /// Failed to parse markup or a selector
    #[error("Failed to parse HTML: {0}")]
    Parse(String),

    /// Invalid URL or header value
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Filesystem failure while loading or saving state
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog or stats (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of failures, used to decide what propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A page or resource could not be retrieved
    FetchFailure,
    /// No selector in a fallback chain matched
    StructuralMismatch,
    /// A single card or candidate lacked an expected sub-element
    FieldExtractionFailure,
    /// The catalog could not be loaded or saved
    PersistenceFailure,
}

impl ScrapeError {
    /// Map this error onto the failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::NotFound(_) | Self::RateLimited(_) => {
                ErrorKind::FetchFailure
            }
            Self::Parse(_) => ErrorKind::StructuralMismatch,
            Self::InvalidUrl(_) => ErrorKind::FieldExtractionFailure,
            Self::Io(_) | Self::Json(_) => ErrorKind::PersistenceFailure,
        }
    }

    /// Only persistence failures are allowed to fail a run.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::PersistenceFailure
    }
}

/// Result type alias for series scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Outcome of extracting one item (a card, an episode candidate).
///
/// Skips carry a human readable reason and are logged by whoever collects
/// them; they never abort the surrounding loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Found(T),
    Skipped(String),
}

impl<T> Extracted<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(item) => Some(item),
            Self::Skipped(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let error = ScrapeError::Parse("missing element".to_string());
        assert_eq!(error.to_string(), "Failed to parse HTML: missing element");
    }

    #[test]
    fn test_error_display_status() {
        let error = ScrapeError::Status {
            url: "https://example.test/a".to_string(),
            status: 503,
        };
        assert_eq!(
            error.to_string(),
            "Unexpected status 503 for https://example.test/a"
        );
    }

    #[test]
    fn test_error_display_not_found() {
        let error = ScrapeError::NotFound("https://example.test/x".to_string());
        assert_eq!(error.to_string(), "Page not found: https://example.test/x");
    }

    #[test]
    fn test_error_kind_fetch() {
        assert_eq!(
            ScrapeError::RateLimited("u".to_string()).kind(),
            ErrorKind::FetchFailure
        );
        assert!(!ScrapeError::NotFound("u".to_string()).is_fatal());
    }

    #[test]
    fn test_error_kind_persistence_is_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ScrapeError::from(io);
        assert_eq!(error.kind(), ErrorKind::PersistenceFailure);
        assert!(error.is_fatal());
    }

    #[test]
    fn test_extracted_found() {
        assert_eq!(Extracted::Found(3).found(), Some(3));
        let skipped: Extracted<u32> = Extracted::skipped("card has no link");
        assert_eq!(skipped.clone().found(), None);
        assert_eq!(skipped, Extracted::Skipped("card has no link".to_string()));
    }
}
