//! Download job definitions and the job state machine.

use crate::PostProcessWarning;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use ytgrab_types::{MediaOptions, ProgressSnapshot};

/// Unique identifier for a download job.
pub type JobId = Uuid;

/// Lifecycle state of a download job.
///
/// States only move forward: `Pending`, `Extracting`, `Fetching`,
/// `PostProcessing`, then one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job was accepted but has not started.
    #[default]
    Pending,
    /// Resolving title and thumbnail.
    Extracting,
    /// Transferring and transcoding media.
    Fetching,
    /// Renaming, tagging and recording history.
    PostProcessing,
    /// Job produced a file.
    Succeeded,
    /// Extraction or fetching failed.
    Failed,
    /// Job was cancelled by the user.
    Cancelled,
}

impl JobState {
    /// Returns true if the job is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Returns true if a job in this state may move to `next`.
    #[must_use]
    pub const fn can_advance_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Extracting)
                | (Self::Extracting, Self::Fetching)
                | (Self::Fetching, Self::PostProcessing)
                | (Self::PostProcessing, Self::Succeeded)
                | (Self::Extracting | Self::Fetching, Self::Failed)
                | (Self::Pending | Self::Extracting | Self::Fetching, Self::Cancelled)
        )
    }

    /// Returns the state as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::Fetching => "fetching",
            Self::PostProcessing => "post_processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the caller asks the controller to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// URL as typed by the user; validated on start.
    pub url: String,
    /// Directory the file is written to; created if missing.
    pub target_dir: PathBuf,
    /// Kind and quality of the output.
    pub options: MediaOptions,
    /// Whether audio files get title, artist and album tags.
    pub apply_metadata: bool,
    /// Whether the thumbnail is embedded as cover art.
    pub embed_thumbnail: bool,
}

impl DownloadRequest {
    /// Creates a request with tagging and cover art enabled.
    #[must_use]
    pub fn new(url: impl Into<String>, target_dir: impl Into<PathBuf>, options: MediaOptions) -> Self {
        Self {
            url: url.into(),
            target_dir: target_dir.into(),
            options,
            apply_metadata: true,
            embed_thumbnail: true,
        }
    }

    /// Enables or disables tagging.
    #[must_use]
    pub const fn with_metadata(mut self, apply_metadata: bool) -> Self {
        self.apply_metadata = apply_metadata;
        self
    }

    /// Enables or disables cover art.
    #[must_use]
    pub const fn with_thumbnail(mut self, embed_thumbnail: bool) -> Self {
        self.embed_thumbnail = embed_thumbnail;
        self
    }
}

/// One download, from acceptance to its terminal state.
///
/// A terminal job carries a result path only when it succeeded and an error
/// message only when it failed. A cancelled job carries neither.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadJob {
    id: JobId,
    url: String,
    target_dir: PathBuf,
    options: MediaOptions,
    apply_metadata: bool,
    embed_thumbnail: bool,
    state: JobState,
    title: Option<String>,
    progress: ProgressSnapshot,
    result_path: Option<PathBuf>,
    error_message: Option<String>,
    warnings: Vec<PostProcessWarning>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl DownloadJob {
    /// Creates a pending job for a request whose URL was already normalized.
    #[must_use]
    pub fn new(url: String, request: &DownloadRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            target_dir: request.target_dir.clone(),
            options: request.options,
            apply_metadata: request.apply_metadata,
            embed_thumbnail: request.embed_thumbnail,
            state: JobState::Pending,
            title: None,
            progress: ProgressSnapshot::default(),
            result_path: None,
            error_message: None,
            warnings: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Returns the job id.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the normalized URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the output directory.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Returns the output options.
    #[must_use]
    pub const fn options(&self) -> &MediaOptions {
        &self.options
    }

    /// Returns true if audio tags are written.
    #[must_use]
    pub const fn apply_metadata(&self) -> bool {
        self.apply_metadata
    }

    /// Returns true if cover art is embedded.
    #[must_use]
    pub const fn embed_thumbnail(&self) -> bool {
        self.embed_thumbnail
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> JobState {
        self.state
    }

    /// Returns the media title once extraction finished.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the most recent progress snapshot.
    #[must_use]
    pub const fn progress(&self) -> &ProgressSnapshot {
        &self.progress
    }

    /// Returns the output file of a succeeded job.
    #[must_use]
    pub fn result_path(&self) -> Option<&Path> {
        self.result_path.as_deref()
    }

    /// Returns the error message of a failed job.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the post-processing warnings of a succeeded job.
    #[must_use]
    pub fn warnings(&self) -> &[PostProcessWarning] {
        &self.warnings
    }

    /// Returns when the job was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the job reached its terminal state.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub(crate) fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        self.state = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    pub(crate) fn set_progress(&mut self, progress: ProgressSnapshot) {
        self.progress = progress;
    }

    pub(crate) fn succeed(&mut self, path: PathBuf, warnings: Vec<PostProcessWarning>) {
        self.result_path = Some(path);
        self.warnings = warnings;
        self.advance(JobState::Succeeded);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.error_message = Some(message);
        self.advance(JobState::Failed);
    }

    pub(crate) fn cancel(&mut self) {
        self.advance(JobState::Cancelled);
    }
}
