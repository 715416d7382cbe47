//! Runs download jobs on Tokio tasks.

use crate::{
    CancellationToken, DownloadJob, DownloadRequest, EventSender, FailureStage, JobEvent, JobId,
    JobState, PostProcessOutcome, PostProcessWarning, PostProcessor,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, Span, debug, error, info, info_span, trace, warn};
use ytgrab_engine::{
    FetchOutcome, FetchRequest, FormatSelector, MediaEngine, MediaInfo, ProgressControl,
    ProgressTranslator, RawProgressEvent, output_template,
};
use ytgrab_types::{ValidationError, output_file_name, validate_url};

/// Reasons a job could not be started.
///
/// No job state exists when any of these is returned.
#[derive(Error, Debug)]
pub enum StartError {
    /// The URL is not a recognized video address.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The target directory does not exist and could not be created.
    #[error("Target directory '{path}' is not usable: {source}")]
    Path {
        /// The rejected directory.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Another job is still running on this controller.
    #[error("A download is already in progress")]
    Busy,
}

/// Drives one download at a time through extraction, fetching and
/// post-processing.
pub struct JobController {
    engine: Arc<dyn MediaEngine>,
    post_processor: Arc<PostProcessor>,
    active: Arc<AtomicBool>,
    span: Span,
}

impl std::fmt::Debug for JobController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobController")
            .field("post_processor", &self.post_processor)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl JobController {
    /// Creates a controller using `engine` and `post_processor`.
    #[must_use]
    pub fn new(engine: Arc<dyn MediaEngine>, post_processor: PostProcessor) -> Self {
        Self {
            engine,
            post_processor: Arc::new(post_processor),
            active: Arc::new(AtomicBool::new(false)),
            span: info_span!("controller"),
        }
    }

    /// Logs job activity inside `span` instead of the default one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns true while a job is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Validates `request` and starts it on a new Tokio task.
    ///
    /// Events for the job are sent to `events`, ending with exactly one
    /// terminal event. The controller accepts a new job as soon as that
    /// terminal event is on its way.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StartError`] if the URL is not recognized, the target
    /// directory is unusable, or a job is already running.
    pub fn start(
        &self,
        request: DownloadRequest,
        events: EventSender,
    ) -> Result<JobHandle, StartError> {
        let url = validate_url(&request.url)?;

        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StartError::Busy);
        }
        let guard = ActiveGuard(Arc::clone(&self.active));
        prepare_target_dir(&request.target_dir)?;

        let job = DownloadJob::new(url, &request);
        let id = job.id();
        let token = CancellationToken::new();
        let span = info_span!(parent: &self.span, "job", %id);

        let run = JobRun {
            job,
            engine: Arc::clone(&self.engine),
            post_processor: Arc::clone(&self.post_processor),
            token: token.clone(),
            events,
            guard: Some(guard),
        };
        let task = tokio::spawn(run.execute().instrument(span));

        Ok(JobHandle { id, token, task })
    }
}

/// Handle to a started job.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    token: CancellationToken,
    task: JoinHandle<DownloadJob>,
}

impl JobHandle {
    /// Returns the job id.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Requests cancellation. Has no effect once fetching has finished.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns a token that cancels this job, for use from other tasks.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Waits for the job and returns its final record.
    ///
    /// # Errors
    ///
    /// Returns an error if the job task panicked.
    pub async fn wait(self) -> Result<DownloadJob, JoinError> {
        self.task.await
    }
}

/// Clears the busy flag when dropped.
#[derive(Debug)]
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct JobRun {
    job: DownloadJob,
    engine: Arc<dyn MediaEngine>,
    post_processor: Arc<PostProcessor>,
    token: CancellationToken,
    events: EventSender,
    guard: Option<ActiveGuard>,
}

impl JobRun {
    async fn execute(mut self) -> DownloadJob {
        info!(url = %self.job.url(), kind = %self.job.options().kind(), "job started");
        self.emit_state().await;

        self.transition(JobState::Extracting).await;
        let info = match self.engine.extract(self.job.url()).await {
            Ok(info) => info,
            Err(e) => return self.fail(FailureStage::Extraction, e.to_string()).await,
        };
        self.job.set_title(info.title.clone());
        self.emit(JobEvent::Info {
            id: self.job.id(),
            title: info.title.clone(),
            thumbnail_url: info.thumbnail_url.clone(),
        })
        .await;

        let mut warnings = Vec::new();
        let thumbnail = self.thumbnail(&info, &mut warnings).await;

        self.transition(JobState::Fetching).await;
        let request = FetchRequest {
            url: self.job.url().to_string(),
            selector: FormatSelector::for_options(self.job.options()),
            output_template: output_template(self.job.target_dir(), &info.title),
        };

        let id = self.job.id();
        let token = self.token.clone();
        let progress_events = self.events.clone();
        let mut translator = ProgressTranslator::new();
        let mut latest = None;
        let mut reported = None;
        let mut on_progress = |raw: RawProgressEvent| {
            if token.is_cancelled() {
                return ProgressControl::Abort;
            }
            if let Some(name) = &raw.filename {
                reported = Some(PathBuf::from(name));
            }
            if let Some(snapshot) = translator.translate(&raw) {
                let percent = snapshot.percent;
                if progress_events
                    .try_send(JobEvent::Progress {
                        id,
                        snapshot: snapshot.clone(),
                    })
                    .is_err()
                {
                    trace!(percent, "progress event dropped");
                }
                latest = Some(snapshot);
            }
            ProgressControl::Continue
        };
        let outcome = self.engine.fetch(&request, &mut on_progress).await;

        if let Some(snapshot) = latest {
            self.job.set_progress(snapshot);
        }
        match outcome {
            Ok(FetchOutcome::Completed) => {}
            Ok(FetchOutcome::Cancelled) => return self.cancelled().await,
            Err(e) => return self.fail(FailureStage::Fetch, e.to_string()).await,
        }

        self.transition(JobState::PostProcessing).await;
        let extension = self.job.options().extension();
        let expected = self
            .job
            .target_dir()
            .join(output_file_name(&info.title, extension));
        let fetched = locate_output(expected, reported, extension);

        let processor = Arc::clone(&self.post_processor);
        let job = self.job.clone();
        let title = info.title;
        let fallback = fetched.clone();
        let processed = tokio::task::spawn_blocking(move || {
            processor.process(&job, &fetched, &title, thumbnail.as_deref())
        })
        .await;

        let outcome = processed.unwrap_or_else(|e| {
            error!(error = %e, "post-processing task failed");
            PostProcessOutcome {
                final_path: fallback,
                warnings: vec![PostProcessWarning::Interrupted {
                    message: e.to_string(),
                }],
            }
        });
        warnings.extend(outcome.warnings);

        info!(path = %outcome.final_path.display(), warnings = warnings.len(), "job succeeded");
        self.job.succeed(outcome.final_path.clone(), warnings.clone());
        self.finish(JobEvent::Succeeded {
            id,
            path: outcome.final_path,
            warnings,
        })
        .await
    }

    async fn thumbnail(
        &self,
        info: &MediaInfo,
        warnings: &mut Vec<PostProcessWarning>,
    ) -> Option<Bytes> {
        let job = &self.job;
        if !(job.options().is_audio() && job.apply_metadata() && job.embed_thumbnail()) {
            return None;
        }
        let url = info.thumbnail_url.as_deref()?;

        match self.engine.thumbnail(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url, error = %e, "thumbnail download failed");
                warnings.push(PostProcessWarning::Thumbnail {
                    message: e.to_string(),
                });
                None
            }
        }
    }

    async fn transition(&mut self, state: JobState) {
        self.job.advance(state);
        debug!(%state, "state changed");
        self.emit_state().await;
    }

    async fn emit_state(&self) {
        self.emit(JobEvent::State {
            id: self.job.id(),
            state: self.job.state(),
        })
        .await;
    }

    async fn emit(&self, event: JobEvent) {
        if self.events.send(event).await.is_err() {
            debug!("event receiver dropped");
        }
    }

    async fn fail(mut self, stage: FailureStage, message: String) -> DownloadJob {
        warn!(%stage, message = %message, "job failed");
        self.job.fail(message.clone());
        let id = self.job.id();
        self.finish(JobEvent::Failed { id, stage, message }).await
    }

    async fn cancelled(mut self) -> DownloadJob {
        info!("job cancelled");
        self.job.cancel();
        let id = self.job.id();
        self.finish(JobEvent::Cancelled { id }).await
    }

    async fn finish(mut self, event: JobEvent) -> DownloadJob {
        drop(self.guard.take());
        self.emit(event).await;
        self.job
    }
}

fn prepare_target_dir(path: &Path) -> Result<(), StartError> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| StartError::Path {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Picks the file the engine produced.
///
/// The engine is asked to write `expected`. When it chose another name, the
/// last file it reported is used with the requested extension, or as-is when
/// no conversion happened.
fn locate_output(expected: PathBuf, reported: Option<PathBuf>, extension: &str) -> PathBuf {
    if expected.exists() {
        return expected;
    }
    let Some(reported) = reported else {
        return expected;
    };
    let converted = reported.with_extension(extension);
    if converted.exists() {
        converted
    } else if reported.exists() {
        reported
    } else {
        expected
    }
}
