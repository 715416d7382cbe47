//! Work done on a fetched file before the job is reported as succeeded.

use crate::tags::{Id3TagWriter, TagWriter, TrackTags, prepare_cover};
use crate::DownloadJob;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Span, debug, info, info_span, warn};
use ytgrab_store::{HistoryEntry, HistoryLog};
use ytgrab_types::{output_file_name, split_title};

/// A non-fatal problem found after the file was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostProcessWarning {
    /// The engine finished but its output file was not found.
    MissingOutput {
        /// Path the output was expected at.
        path: PathBuf,
    },
    /// The fetched file could not be moved to its derived name.
    Rename {
        /// Path the engine wrote.
        from: PathBuf,
        /// Derived path.
        to: PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The thumbnail could not be downloaded.
    Thumbnail {
        /// Underlying error.
        message: String,
    },
    /// The thumbnail could not be turned into cover art.
    Cover {
        /// Underlying error.
        message: String,
    },
    /// Tags could not be written.
    Tags {
        /// Underlying error.
        message: String,
    },
    /// The history record could not be saved.
    History {
        /// Underlying error.
        message: String,
    },
    /// Post-processing stopped before it finished.
    Interrupted {
        /// Underlying error.
        message: String,
    },
}

impl std::fmt::Display for PostProcessWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOutput { path } => {
                write!(f, "downloaded file not found at '{}'", path.display())
            }
            Self::Rename { from, to, message } => write!(
                f,
                "could not rename '{}' to '{}': {message}",
                from.display(),
                to.display()
            ),
            Self::Thumbnail { message } => write!(f, "thumbnail unavailable: {message}"),
            Self::Cover { message } => write!(f, "cover art skipped: {message}"),
            Self::Tags { message } => write!(f, "tags not written: {message}"),
            Self::History { message } => write!(f, "history not updated: {message}"),
            Self::Interrupted { message } => write!(f, "post-processing interrupted: {message}"),
        }
    }
}

/// Result of post-processing a fetched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessOutcome {
    /// Path of the file the job produced.
    pub final_path: PathBuf,
    /// Problems that did not prevent success.
    pub warnings: Vec<PostProcessWarning>,
}

/// Renames, tags and records a fetched file.
///
/// Every step is best effort: failures are logged and returned as warnings.
#[derive(Debug)]
pub struct PostProcessor {
    tag_writer: Box<dyn TagWriter>,
    history: Arc<HistoryLog>,
    span: Span,
}

impl PostProcessor {
    /// Album label written into audio tags.
    pub const DEFAULT_ALBUM: &'static str = "YouTube Download";

    /// Creates a post-processor writing ID3 tags.
    #[must_use]
    pub fn new(history: Arc<HistoryLog>) -> Self {
        Self::with_tag_writer(history, Box::new(Id3TagWriter))
    }

    /// Creates a post-processor with a custom tag writer.
    #[must_use]
    pub fn with_tag_writer(history: Arc<HistoryLog>, tag_writer: Box<dyn TagWriter>) -> Self {
        Self {
            tag_writer,
            history,
            span: info_span!("postprocess"),
        }
    }

    /// Logs inside `span` instead of the default one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the history log entries are appended to.
    #[must_use]
    pub const fn history(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    /// Finishes a fetched file.
    ///
    /// Moves `fetched_path` to the name derived from `title`, keeping the
    /// extension the file was written with. Tags audio files when the job
    /// asks for it, and appends a history entry.
    /// `thumbnail` holds the raw thumbnail bytes, if they were downloaded.
    pub fn process(
        &self,
        job: &DownloadJob,
        fetched_path: &Path,
        title: &str,
        thumbnail: Option<&[u8]>,
    ) -> PostProcessOutcome {
        let _enter = self.span.enter();
        let mut warnings = Vec::new();

        let extension = fetched_path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_else(|| job.options().extension());
        let derived = job.target_dir().join(output_file_name(title, extension));
        let final_path = move_to(fetched_path, derived, &mut warnings);
        let present = final_path.exists();

        let (artist, song) = split_title(title);
        if present && job.options().is_audio() && job.apply_metadata() {
            let cover = thumbnail
                .filter(|_| job.embed_thumbnail())
                .and_then(|bytes| match prepare_cover(bytes) {
                    Ok(cover) => Some(cover),
                    Err(e) => {
                        warn!(error = %e, "cover art skipped");
                        warnings.push(PostProcessWarning::Cover {
                            message: e.to_string(),
                        });
                        None
                    }
                });

            let tags = TrackTags {
                title: song.clone(),
                artist,
                album: Self::DEFAULT_ALBUM.to_string(),
                cover,
            };
            match self.tag_writer.apply_tags(&final_path, &tags) {
                Ok(()) => debug!(path = %final_path.display(), "tags written"),
                Err(e) => {
                    warn!(path = %final_path.display(), error = %e, "failed to write tags");
                    warnings.push(PostProcessWarning::Tags {
                        message: e.to_string(),
                    });
                }
            }
        }

        let history_title = if job.options().is_audio() {
            song
        } else {
            title.to_string()
        };
        let entry = HistoryEntry::new(
            job.url(),
            history_title,
            job.options().kind(),
            final_path.clone(),
        );
        if let Err(e) = self.history.append(entry) {
            warn!(error = %e, "failed to record history");
            warnings.push(PostProcessWarning::History {
                message: e.to_string(),
            });
        }

        info!(path = %final_path.display(), warnings = warnings.len(), "post-processing finished");
        PostProcessOutcome {
            final_path,
            warnings,
        }
    }
}

fn move_to(fetched: &Path, derived: PathBuf, warnings: &mut Vec<PostProcessWarning>) -> PathBuf {
    if !fetched.exists() {
        warn!(path = %fetched.display(), "fetched file not found");
        warnings.push(PostProcessWarning::MissingOutput {
            path: fetched.to_path_buf(),
        });
        return fetched.to_path_buf();
    }
    if fetched == derived {
        return derived;
    }

    match fs::rename(fetched, &derived) {
        Ok(()) => {
            debug!(from = %fetched.display(), to = %derived.display(), "renamed output");
            derived
        }
        Err(e) => {
            warn!(from = %fetched.display(), error = %e, "failed to rename output");
            warnings.push(PostProcessWarning::Rename {
                from: fetched.to_path_buf(),
                to: derived,
                message: e.to_string(),
            });
            fetched.to_path_buf()
        }
    }
}
