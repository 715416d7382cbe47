//! History log and configuration persistence for ytgrab.
//!
//! - [`HistoryLog`] - Bounded newest-first record of completed downloads
//! - [`HistoryEntry`] - One immutable history record
//! - [`ConfigStore`] - Flat JSON settings file with default backfill
//! - [`AppConfig`] - Typed view of the recognized settings
//! - [`StorePaths`] - Platform locations of the files above

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod history;
mod paths;

pub use config::{AppConfig, ConfigStore, Theme};
pub use error::{Result, StoreError};
pub use history::{HISTORY_LIMIT, HistoryEntry, HistoryLog};
pub use paths::StorePaths;
