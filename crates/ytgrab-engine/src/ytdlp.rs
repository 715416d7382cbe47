//! Driver for the `yt-dlp` executable.
//!
//! Metadata is read from `--dump-single-json`. During a fetch the engine is
//! asked to print one JSON progress object per line behind [`PROGRESS_PREFIX`],
//! which is deserialized into a [`RawProgressEvent`] and handed to the
//! caller's progress callback.

use crate::{
    EngineError, FetchOutcome, FetchRequest, MediaEngine, MediaInfo, ProgressControl,
    RawProgressEvent, Result, ThumbnailClient,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Marker in front of every progress line the engine prints.
pub const PROGRESS_PREFIX: &str = "[ytgrab-progress]";

/// Configuration for the yt-dlp driver.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments placed before all others, e.g. `["-m", "yt_dlp"]` for a Python launcher.
    pub program_args: Vec<String>,
    /// User agent sent with media requests.
    pub user_agent: String,
    /// Value of the `Accept-Language` header.
    pub accept_language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            program_args: Vec::new(),
            user_agent: "Mozilla/5.0".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// [`MediaEngine`] backed by the `yt-dlp` command line tool.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    config: EngineConfig,
    thumbnails: ThumbnailClient,
}

impl YtDlpEngine {
    /// Creates a driver with the given configuration and thumbnail client.
    #[must_use]
    pub const fn new(config: EngineConfig, thumbnails: ThumbnailClient) -> Self {
        Self { config, thumbnails }
    }

    /// Creates a driver for `yt-dlp` on `PATH` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the thumbnail HTTP client cannot be created.
    pub fn with_defaults() -> std::result::Result<Self, reqwest::Error> {
        Ok(Self::new(
            EngineConfig::default(),
            ThumbnailClient::with_defaults()?,
        ))
    }

    /// Returns the driver configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.program_args)
            .args(self.common_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Keep terminal signals away from the child; cancellation stops it.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    fn common_args(&self) -> Vec<String> {
        vec![
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "--user-agent".to_string(),
            self.config.user_agent.clone(),
            "--add-header".to_string(),
            format!("Accept-Language:{}", self.config.accept_language),
        ]
    }

    /// Returns the fetch-specific arguments for `request`.
    #[must_use]
    pub fn fetch_args(request: &FetchRequest) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--progress".to_string(),
            "--newline".to_string(),
            "--progress-template".to_string(),
            format!("download:{PROGRESS_PREFIX}%(progress)j"),
            "--output".to_string(),
            request.output_template.clone(),
        ];
        args.extend(request.selector.to_args());
        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            program: self.config.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn extract(&self, url: &str) -> Result<MediaInfo> {
        debug!(url, "extracting media info");
        let output = self
            .command()
            .args(["--dump-single-json", "--skip-download", "--", url])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Exited {
                code: output.status.code(),
                message: last_error_line(&stderr, output.status.code()),
            });
        }

        let raw: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        Ok(MediaInfo::from_raw(raw))
    }

    async fn fetch(
        &self,
        request: &FetchRequest,
        on_progress: &mut (dyn FnMut(RawProgressEvent) -> ProgressControl + Send),
    ) -> Result<FetchOutcome> {
        info!(url = %request.url, format = %request.selector.format, "starting fetch");
        let mut child = self
            .command()
            .args(Self::fetch_args(request))
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Other("engine stdout was not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Other("engine stderr was not captured".to_string()))?;

        // Drained concurrently so a chatty engine cannot block on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(event) = parse_progress_line(&line) else {
                debug!(line = %line, "engine output");
                continue;
            };

            if on_progress(event) == ProgressControl::Abort {
                info!(url = %request.url, "fetch aborted by progress callback");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to stop engine process");
                }
                stderr_task.abort();
                return Ok(FetchOutcome::Cancelled);
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(FetchOutcome::Completed)
        } else {
            Err(EngineError::Exited {
                code: status.code(),
                message: last_error_line(&stderr, status.code()),
            })
        }
    }

    async fn thumbnail(&self, url: &str) -> Result<Option<Bytes>> {
        Ok(self.thumbnails.fetch(url).await?)
    }
}

/// Parses one line of engine output into a progress event.
fn parse_progress_line(line: &str) -> Option<RawProgressEvent> {
    let json = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    match serde_json::from_str(json) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, "unparsable progress line");
            None
        }
    }
}

/// Picks the most useful diagnostic line from the engine's stderr.
fn last_error_line(stderr: &str, code: Option<i32>) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map_or_else(
            || match code {
                Some(code) => format!("engine exited with status {code}"),
                None => "engine was terminated by a signal".to_string(),
            },
            |line| (*line).to_string(),
        )
}
