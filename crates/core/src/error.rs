//! Error types for beanpress operations.
//!
//! This module defines the main error type [`BeanpressError`] which represents
//! every failure that can surface from fetching, parsing, caching and rendering.
//!
//! Word-level problems (an annotation missing its traditional span, a gloss
//! without a difficulty marker) are not errors: the extractor drops or keeps
//! the word and carries on.
//!
//! # Example
//!
//! ```rust
//! use beanpress_core::{BeanpressError, Result};
//!
//! fn check_capacity(capacity: usize) -> Result<usize> {
//!     if capacity == 0 {
//!         return Err(BeanpressError::InvalidCapacity(capacity));
//!     }
//!     Ok(capacity)
//! }
//! # assert!(check_capacity(0).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for harvesting and layout operations.
#[derive(Error, Debug)]
pub enum BeanpressError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The task fetching a page panicked or was cancelled.
    #[error("Fetch of {url} did not complete: {reason}")]
    FetchAborted { url: String, reason: String },

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The article listing does not have the structure needed to paginate it.
    #[error("Unexpected listing page structure: {0}")]
    ListingError(String),

    /// A column must hold at least one entry.
    #[error("Column capacity must be at least 1 (got {0})")]
    InvalidCapacity(usize),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// A persisted cache file exists but does not match the expected schema.
    ///
    /// This is fatal; nothing regenerates the cache behind the caller's back.
    #[error("Cache file {} is corrupted: {source}", path.display())]
    CacheCorruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization of a cache or JSON output failed.
    #[error("Serialization failed: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Document packaging failed.
    #[error("Failed to render document: {0}")]
    RenderError(String),
}

impl BeanpressError {
    /// Returns `true` for failures that only affect the article being fetched.
    ///
    /// The harvester skips an article on these and keeps going; every other
    /// variant is propagated.
    pub fn is_fetch_failure(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            BeanpressError::HttpError(_) => true,
            BeanpressError::Timeout { .. }
            | BeanpressError::HttpStatus { .. }
            | BeanpressError::InvalidUrl(_)
            | BeanpressError::FetchAborted { .. } => true,
            _ => false,
        }
    }
}

impl From<zip::result::ZipError> for BeanpressError {
    fn from(err: zip::result::ZipError) -> Self {
        BeanpressError::RenderError(err.to_string())
    }
}

/// Result type alias for BeanpressError.
pub type Result<T> = std::result::Result<T, BeanpressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BeanpressError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_http_status_error() {
        let err = BeanpressError::HttpStatus { url: "https://example.com/a".to_string(), status: 404 };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("https://example.com/a"));
    }

    #[test]
    fn test_timeout_error() {
        let err = BeanpressError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_fetch_failure_classification() {
        assert!(BeanpressError::Timeout { timeout: 5 }.is_fetch_failure());
        assert!(BeanpressError::InvalidUrl("x".to_string()).is_fetch_failure());
        assert!(BeanpressError::FetchAborted { url: "x".to_string(), reason: "panic".to_string() }.is_fetch_failure());
        assert!(!BeanpressError::InvalidCapacity(0).is_fetch_failure());
        assert!(!BeanpressError::FileNotFound(PathBuf::from("/nope")).is_fetch_failure());
    }

    #[test]
    fn test_cache_corruption_mentions_path() {
        let source = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err = BeanpressError::CacheCorruption { path: PathBuf::from("final_text.json"), source };
        assert!(err.to_string().contains("final_text.json"));
        assert!(!err.is_fetch_failure());
    }
}
