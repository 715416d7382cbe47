//! Media download orchestration on top of yt-dlp.
//!
//! This is a facade crate that re-exports functionality from the ytgrab
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ytgrab_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let paths = StorePaths::platform_default();
//!     let history = Arc::new(HistoryLog::open(&paths));
//!     let engine = Arc::new(YtDlpEngine::with_defaults()?);
//!     let controller = JobController::new(engine, PostProcessor::new(history));
//!
//!     let request = DownloadRequest::new(
//!         "https://youtu.be/dQw4w9WgXcQ",
//!         "/tmp/music",
//!         MediaOptions::Audio { quality: AudioQuality::Kbps320 },
//!     );
//!     let (tx, mut rx) = event_channel(DEFAULT_EVENT_CAPACITY);
//!     let handle = controller.start(request, tx)?;
//!
//!     while let Some(event) = rx.recv().await {
//!         println!("{event:?}");
//!         if event.is_terminal() {
//!             break;
//!         }
//!     }
//!     handle.wait().await?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use ytgrab_types::*;

// Re-export the engine
#[cfg(feature = "engine")]
pub use ytgrab_engine::{
    EngineConfig, EngineError, FetchOutcome, FetchRequest, FormatSelector, MediaEngine,
    MediaInfo, PROGRESS_PREFIX, ProgressControl, ProgressTranslator, RawProgressEvent,
    ThumbnailClient, ThumbnailConfig, YtDlpEngine, output_template, strip_ansi,
};

// Re-export persistence
#[cfg(feature = "store")]
pub use ytgrab_store::{
    AppConfig, ConfigStore, HISTORY_LIMIT, HistoryEntry, HistoryLog, StoreError, StorePaths,
    Theme,
};

// Re-export job orchestration
#[cfg(feature = "job")]
pub use ytgrab_job::{
    CancellationToken, CoverError, DEFAULT_EVENT_CAPACITY, DownloadJob, DownloadRequest,
    EventReceiver, EventSender, FailureStage, Id3TagWriter, JobController, JobEvent, JobHandle,
    JobId, JobState, MAX_COVER_EDGE, PostProcessOutcome, PostProcessWarning, PostProcessor,
    StartError, TagError, TagWriter, TrackTags, event_channel, prepare_cover,
};

/// Prelude module for convenient imports.
///
/// ```
/// use ytgrab_lib::prelude::*;
/// ```
pub mod prelude {
    pub use ytgrab_types::{
        AudioQuality, MediaKind, MediaOptions, ProgressSnapshot, ValidationError, VideoFormat,
        VideoQuality, validate_url,
    };

    #[cfg(feature = "engine")]
    pub use ytgrab_engine::{EngineConfig, MediaEngine, YtDlpEngine};

    #[cfg(feature = "store")]
    pub use ytgrab_store::{AppConfig, ConfigStore, HistoryEntry, HistoryLog, StorePaths};

    #[cfg(feature = "job")]
    pub use ytgrab_job::{
        DEFAULT_EVENT_CAPACITY, DownloadRequest, JobController, JobEvent, JobHandle, JobState,
        PostProcessor, StartError, event_channel,
    };
}
