//! Download job orchestration for ytgrab.
//!
//! This crate drives one download from request to tagged file:
//!
//! - [`JobController`] - Runs a job through its states on a Tokio task
//! - [`DownloadJob`] - The job record and its linear state machine
//! - [`JobEvent`] - State, progress and terminal notifications
//! - [`CancellationToken`] - Cooperative cancellation flag
//! - [`PostProcessor`] - Renaming, tagging and history logging after a fetch
//! - [`TagWriter`] - Contract for embedding tags and cover art

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cancel;
mod controller;
mod event;
mod job;
mod postprocess;
mod tags;

pub use cancel::CancellationToken;
pub use controller::{JobController, JobHandle, StartError};
pub use event::{
    DEFAULT_EVENT_CAPACITY, EventReceiver, EventSender, FailureStage, JobEvent, event_channel,
};
pub use job::{DownloadJob, DownloadRequest, JobId, JobState};
pub use postprocess::{PostProcessOutcome, PostProcessWarning, PostProcessor};
pub use tags::{CoverError, Id3TagWriter, MAX_COVER_EDGE, TagError, TagWriter, TrackTags, prepare_cover};
