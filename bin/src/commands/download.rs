//! Download command implementation.
//!
//! Runs one job through the controller, rendering its events as a progress
//! bar. Ctrl-C cancels the job instead of killing the process.

use crate::display::{format_bytes, job_progress_bar, state_label};
use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use ytgrab_lib::{
    AppConfig, AudioQuality, ConfigStore, DEFAULT_EVENT_CAPACITY, DownloadRequest, HistoryLog,
    JobController, JobEvent, JobState, MediaOptions, PostProcessor, StorePaths, VideoFormat,
    VideoQuality, YtDlpEngine, event_channel,
};

/// Arguments of the download command.
pub(crate) struct DownloadArgs {
    pub(crate) url: String,
    pub(crate) video: bool,
    pub(crate) quality: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) no_metadata: bool,
}

/// Resolves the output options from the flags, falling back to the configuration.
fn media_options(args: &DownloadArgs, config: &AppConfig) -> Result<MediaOptions> {
    if !args.video {
        if args.format.is_some() {
            bail!("--format only applies to video downloads (add --video)");
        }
        return match &args.quality {
            Some(raw) => {
                let quality = raw.parse::<AudioQuality>().map_err(|e| anyhow!("{e}"))?;
                Ok(MediaOptions::Audio { quality })
            }
            None => Ok(config.audio_options()),
        };
    }

    if args.format.is_none() && args.quality.is_none() {
        return Ok(config.video_options());
    }
    let format = match &args.format {
        Some(raw) => raw.parse::<VideoFormat>().map_err(|e| anyhow!("{e}"))?,
        None => config.video_format,
    };
    let quality = match &args.quality {
        Some(raw) => raw.parse::<VideoQuality>().map_err(|e| anyhow!("{e}"))?,
        None => config.video_quality,
    };
    Ok(MediaOptions::Video { format, quality })
}

/// Stores the choices of this download as the new defaults.
fn remember_choices(config: &mut AppConfig, target_dir: PathBuf, options: MediaOptions) {
    config.default_path = target_dir;
    match options {
        MediaOptions::Audio { quality } => config.audio_quality = quality,
        MediaOptions::Video { format, quality } => {
            config.video_format = format;
            config.video_quality = quality;
        }
    }
}

/// Download one URL.
pub(crate) async fn download(paths: &StorePaths, args: DownloadArgs, quiet: bool) -> Result<()> {
    let store = ConfigStore::open(paths);
    let mut config = store.load().context("Failed to load configuration")?;

    let options = media_options(&args, &config)?;
    let target_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.default_path.clone());

    let history = Arc::new(HistoryLog::open(paths));
    let engine = YtDlpEngine::with_defaults().context("Failed to create HTTP client")?;
    let controller = JobController::new(Arc::new(engine), PostProcessor::new(history));

    let request = DownloadRequest::new(args.url, target_dir.clone(), options)
        .with_metadata(config.apply_metadata && !args.no_metadata)
        .with_thumbnail(config.save_thumbnails);

    let (tx, mut rx) = event_channel(DEFAULT_EVENT_CAPACITY);
    let handle = controller.start(request, tx)?;
    debug!(id = %handle.id(), "download started");

    remember_choices(&mut config, target_dir, options);
    store.save(&config).context("Failed to save configuration")?;

    let token = handle.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let progress = job_progress_bar(quiet)?;
    let mut failure = None;
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::State { state, .. } => progress.set_message(state_label(state)),
            JobEvent::Info { title, .. } => {
                if !quiet {
                    progress.println(format!("Title: {title}"));
                }
            }
            JobEvent::Progress { snapshot, .. } => {
                progress.set_position(u64::from(snapshot.percent));
                progress.set_message(format!("{} | ETA {}", snapshot.speed, snapshot.eta));
            }
            JobEvent::Succeeded { path, warnings, .. } => {
                progress.finish_with_message(state_label(JobState::Succeeded));
                for warning in &warnings {
                    eprintln!("Warning: {warning}");
                }
                let size = std::fs::metadata(&path)
                    .map(|meta| format_bytes(meta.len()))
                    .unwrap_or_else(|_| "size unknown".to_string());
                println!("Saved to: {} ({size})", path.display());
                break;
            }
            JobEvent::Failed { stage, message, .. } => {
                progress.abandon_with_message(state_label(JobState::Failed));
                failure = Some(format!("Download failed during {stage}: {message}"));
                break;
            }
            JobEvent::Cancelled { .. } => {
                progress.abandon_with_message(state_label(JobState::Cancelled));
                println!("Download cancelled.");
                break;
            }
        }
    }

    let job = handle.wait().await.context("Download task failed")?;
    debug!(state = %job.state(), "download finished");
    if let Some(failure) = failure {
        bail!(failure);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(video: bool, quality: Option<&str>, format: Option<&str>) -> DownloadArgs {
        DownloadArgs {
            url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            video,
            quality: quality.map(str::to_string),
            format: format.map(str::to_string),
            output_dir: None,
            no_metadata: false,
        }
    }

    #[test]
    fn test_options_default_to_config() {
        let config = AppConfig {
            audio_quality: AudioQuality::Kbps192,
            ..AppConfig::default()
        };
        let options = media_options(&args(false, None, None), &config).unwrap();
        assert_eq!(
            options,
            MediaOptions::Audio {
                quality: AudioQuality::Kbps192
            }
        );
    }

    #[test]
    fn test_video_defaults_to_config() {
        let config = AppConfig {
            video_format: VideoFormat::Mkv,
            ..AppConfig::default()
        };
        let options = media_options(&args(true, None, None), &config).unwrap();
        assert_eq!(options, config.video_options());
        assert_eq!(options.extension(), "mkv");
    }

    #[test]
    fn test_video_flags_override_config() {
        let options =
            media_options(&args(true, Some("1080p"), Some("mkv")), &AppConfig::default()).unwrap();
        assert_eq!(
            options,
            MediaOptions::Video {
                format: VideoFormat::Mkv,
                quality: VideoQuality::P1080
            }
        );
    }

    #[test]
    fn test_format_requires_video() {
        assert!(media_options(&args(false, None, Some("mp4")), &AppConfig::default()).is_err());
        assert!(media_options(&args(false, Some("4k"), None), &AppConfig::default()).is_err());
    }

    #[test]
    fn test_remember_choices() {
        let mut config = AppConfig::default();
        remember_choices(
            &mut config,
            PathBuf::from("/music"),
            MediaOptions::Video {
                format: VideoFormat::Mkv,
                quality: VideoQuality::P360,
            },
        );
        assert_eq!(config.default_path, PathBuf::from("/music"));
        assert_eq!(config.video_format, VideoFormat::Mkv);
        assert_eq!(config.video_quality, VideoQuality::P360);
        assert_eq!(config.audio_quality, AudioQuality::Kbps320);
    }
}
