//! Error types for ytgrab core types.

use thiserror::Error;

/// Errors raised while validating a job's URL before any work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The URL was empty or whitespace.
    #[error("URL cannot be empty")]
    EmptyUrl,

    /// The URL does not point at a recognized video-hosting address.
    #[error("URL does not look like a YouTube address: {0}")]
    UnsupportedUrl(String),
}

/// Error returned when parsing an option value (quality, format, kind) fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {what} '{value}', expected one of: {expected}")]
pub struct ParseOptionError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseOptionError {
    pub(crate) fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            what,
            value: value.to_string(),
            expected,
        }
    }
}
