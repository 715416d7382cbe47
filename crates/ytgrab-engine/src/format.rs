//! Mapping of quality options to engine stream-selection parameters.

use std::path::Path;
use ytgrab_types::{AudioQuality, MediaOptions, VideoFormat, sanitize_filename};

/// Stream selection and post-processing parameters for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector {
    /// Engine format expression.
    pub format: String,
    /// Container to merge separate video and audio streams into.
    pub merge_output_format: Option<VideoFormat>,
    /// Audio extraction target, for audio-only jobs.
    pub extract_audio: Option<AudioQuality>,
}

impl FormatSelector {
    /// Builds the selector for the given options.
    ///
    /// Video is bounded by height with the best audio merged in, falling back
    /// to the best single stream under the same bound. Audio takes the best
    /// audio stream and extracts it to mp3 at the requested bitrate.
    ///
    /// ```
    /// use ytgrab_engine::FormatSelector;
    /// use ytgrab_types::{MediaOptions, VideoFormat, VideoQuality};
    ///
    /// let selector = FormatSelector::for_options(&MediaOptions::Video {
    ///     format: VideoFormat::Mp4,
    ///     quality: VideoQuality::P720,
    /// });
    /// assert_eq!(selector.format, "bestvideo[height<=720]+bestaudio/best[height<=720]");
    /// ```
    #[must_use]
    pub fn for_options(options: &MediaOptions) -> Self {
        match *options {
            MediaOptions::Audio { quality } => Self {
                format: "bestaudio/best".to_string(),
                merge_output_format: None,
                extract_audio: Some(quality),
            },
            MediaOptions::Video { format, quality } => {
                let height = quality.height();
                Self {
                    format: format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]"),
                    merge_output_format: Some(format),
                    extract_audio: None,
                }
            }
        }
    }

    /// Returns the command line arguments for this selector.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--format".to_string(), self.format.clone()];
        if let Some(container) = self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.extension().to_string());
        }
        if let Some(quality) = self.extract_audio {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
                "--audio-quality".to_string(),
                format!("{}K", quality.kbps()),
            ]);
        }
        args
    }
}

/// Builds the engine output template `<dir>/<sanitized title>.%(ext)s`.
///
/// `%` in the title is doubled so the engine does not treat it as a field.
#[must_use]
pub fn output_template(target_dir: &Path, title: &str) -> String {
    let stem = sanitize_filename(title).replace('%', "%%");
    target_dir
        .join(format!("{stem}.%(ext)s"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytgrab_types::VideoQuality;

    #[test]
    fn test_video_selector_for_each_quality() {
        for quality in VideoQuality::all() {
            let selector = FormatSelector::for_options(&MediaOptions::Video {
                format: VideoFormat::Mkv,
                quality: *quality,
            });
            let h = quality.height();
            assert_eq!(
                selector.format,
                format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]")
            );
            assert_eq!(selector.merge_output_format, Some(VideoFormat::Mkv));
            assert!(selector.extract_audio.is_none());
        }
    }

    #[test]
    fn test_audio_selector_args() {
        let selector = FormatSelector::for_options(&MediaOptions::Audio {
            quality: AudioQuality::Kbps192,
        });
        assert_eq!(
            selector.to_args(),
            vec![
                "--format",
                "bestaudio/best",
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "192K"
            ]
        );
    }

    #[test]
    fn test_video_selector_args_merge_container() {
        let selector = FormatSelector::for_options(&MediaOptions::Video {
            format: VideoFormat::Mp4,
            quality: VideoQuality::P360,
        });
        let args = selector.to_args();
        assert_eq!(args[2], "--merge-output-format");
        assert_eq!(args[3], "mp4");
    }

    #[test]
    fn test_output_template_sanitizes_and_escapes() {
        let template = output_template(Path::new("/music"), "100% Hits: Vol/1");
        assert_eq!(template, "/music/100%% Hits_ Vol_1.%(ext)s");
    }
}
