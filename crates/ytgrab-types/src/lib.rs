//! Core types for the ytgrab media downloader.
//!
//! This crate provides the fundamental data structures used throughout ytgrab:
//!
//! - [`MediaKind`] - Whether a job produces an audio or a video file
//! - [`MediaOptions`] - Quality and container choices, exclusive by kind
//! - [`ProgressSnapshot`] - Structured progress derived from engine events
//! - [`validate_url`] - Recognizes and normalizes video-hosting URLs
//! - [`sanitize_filename`] and [`split_title`] - Title-to-filename helpers

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod filename;
mod media;
mod progress;
mod url;

pub use error::{ParseOptionError, ValidationError};
pub use filename::{output_file_name, sanitize_filename, split_title};
pub use media::{AudioQuality, MediaKind, MediaOptions, VideoFormat, VideoQuality};
pub use progress::{NOT_AVAILABLE, ProgressSnapshot};
pub use url::validate_url;
