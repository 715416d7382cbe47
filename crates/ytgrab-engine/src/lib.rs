//! Media fetch engine contract and yt-dlp driver for ytgrab.
//!
//! This crate provides everything that talks to the external engine:
//!
//! - [`MediaEngine`] - Async contract for metadata extraction and fetching
//! - [`FormatSelector`] - Maps quality options to engine format expressions
//! - [`ProgressTranslator`] - Turns raw progress events into snapshots
//! - [`YtDlpEngine`] - Drives the `yt-dlp` executable as a child process
//! - [`ThumbnailClient`] - HTTP client for thumbnail images

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod format;
mod thumbnail;
mod translate;
mod ytdlp;

pub use engine::{
    EngineError, FetchOutcome, FetchRequest, MediaEngine, MediaInfo, ProgressControl,
    RawProgressEvent, Result,
};
pub use format::{FormatSelector, output_template};
pub use thumbnail::{ThumbnailClient, ThumbnailConfig};
pub use translate::{ProgressTranslator, strip_ansi};
pub use ytdlp::{EngineConfig, PROGRESS_PREFIX, YtDlpEngine};
