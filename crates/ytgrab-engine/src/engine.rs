//! The media fetch engine contract.

use crate::FormatSelector;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a media engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// The program that could not be started.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Reading the engine's output failed.
    #[error("I/O error while talking to the engine: {0}")]
    Io(#[from] std::io::Error),

    /// The engine exited unsuccessfully.
    #[error("{message}")]
    Exited {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Last diagnostic line printed by the engine.
        message: String,
    },

    /// The engine printed metadata that could not be parsed.
    #[error("Failed to parse engine metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The thumbnail request failed.
    #[error("Thumbnail request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other engine-reported failure.
    #[error("{0}")]
    Other(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Metadata resolved for a URL without downloading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Media title.
    pub title: String,
    /// URL of the preferred thumbnail image.
    pub thumbnail_url: Option<String>,
    /// The engine's full metadata document.
    pub raw: serde_json::Value,
}

impl MediaInfo {
    /// Title used when the engine does not report one.
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";

    /// Builds media info from the engine's raw metadata document.
    #[must_use]
    pub fn from_raw(raw: serde_json::Value) -> Self {
        let title = raw
            .get("title")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(Self::UNKNOWN_TITLE)
            .to_string();
        let thumbnail_url = raw
            .get("thumbnail")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Self {
            title,
            thumbnail_url,
            raw,
        }
    }
}

/// A single engine-native progress event.
///
/// Field names follow the engine's progress dictionary so events can be
/// deserialized directly from its JSON progress output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProgressEvent {
    /// Event status, e.g. `downloading`, `finished` or `error`.
    #[serde(default)]
    pub status: String,
    /// Percentage as a display string, possibly with color escapes.
    #[serde(rename = "_percent_str", default)]
    pub percent_str: Option<String>,
    /// Speed as a display string.
    #[serde(rename = "_speed_str", default)]
    pub speed_str: Option<String>,
    /// ETA as a display string.
    #[serde(rename = "_eta_str", default)]
    pub eta_str: Option<String>,
    /// File currently being written.
    #[serde(default)]
    pub filename: Option<String>,
    /// Bytes written so far.
    #[serde(default)]
    pub downloaded_bytes: Option<u64>,
    /// Total size, when known.
    #[serde(default)]
    pub total_bytes: Option<u64>,
}

impl RawProgressEvent {
    /// Creates a `downloading` event with the given display strings.
    #[must_use]
    pub fn downloading(percent: &str, speed: Option<&str>, eta: Option<&str>) -> Self {
        Self {
            status: "downloading".to_string(),
            percent_str: Some(percent.to_string()),
            speed_str: speed.map(str::to_string),
            eta_str: eta.map(str::to_string),
            ..Default::default()
        }
    }

    /// Returns true if this event reports transfer progress.
    #[must_use]
    pub fn is_downloading(&self) -> bool {
        self.status == "downloading"
    }
}

/// What the engine should do after delivering a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressControl {
    /// Keep transferring.
    Continue,
    /// Stop the transfer at this point.
    Abort,
}

/// How a fetch ended when the engine did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The transfer and transcoding finished.
    Completed,
    /// The progress callback asked the engine to stop.
    Cancelled,
}

/// Parameters for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Validated media URL.
    pub url: String,
    /// Stream selection for the engine.
    pub selector: FormatSelector,
    /// Engine output template, including the `%(ext)s` placeholder.
    pub output_template: String,
}

/// Contract for the external media fetch engine.
///
/// `fetch` must call `on_progress` for every progress event it observes and
/// stop as soon as the callback returns [`ProgressControl::Abort`], returning
/// [`FetchOutcome::Cancelled`].
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Resolves title and thumbnail for `url` without downloading media.
    async fn extract(&self, url: &str) -> Result<MediaInfo>;

    /// Downloads and transcodes the media described by `request`.
    async fn fetch(
        &self,
        request: &FetchRequest,
        on_progress: &mut (dyn FnMut(RawProgressEvent) -> ProgressControl + Send),
    ) -> Result<FetchOutcome>;

    /// Downloads thumbnail bytes, or `None` when the server has none to give.
    async fn thumbnail(&self, url: &str) -> Result<Option<Bytes>>;
}
