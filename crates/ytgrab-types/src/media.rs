//! Media kind, quality and container definitions.

use crate::ParseOptionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a job produces an audio file or a video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio-only extraction to mp3.
    Audio,
    /// Video with merged audio.
    Video,
}

impl MediaKind {
    /// Returns the kind as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target bitrate for audio extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AudioQuality {
    /// 128 kbps.
    #[serde(rename = "128")]
    Kbps128,
    /// 192 kbps.
    #[serde(rename = "192")]
    Kbps192,
    /// 320 kbps.
    #[default]
    #[serde(rename = "320")]
    Kbps320,
}

impl AudioQuality {
    /// Returns the bitrate in kbps.
    #[must_use]
    pub const fn kbps(&self) -> u32 {
        match self {
            Self::Kbps128 => 128,
            Self::Kbps192 => 192,
            Self::Kbps320 => 320,
        }
    }

    /// Returns the quality as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kbps128 => "128",
            Self::Kbps192 => "192",
            Self::Kbps320 => "320",
        }
    }
}

impl std::fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioQuality {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches("kbps").trim_end_matches('k') {
            "128" => Ok(Self::Kbps128),
            "192" => Ok(Self::Kbps192),
            "320" => Ok(Self::Kbps320),
            _ => Err(ParseOptionError::new("audio quality", s, "128, 192, 320")),
        }
    }
}

/// Container for merged video downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// MPEG-4 container.
    #[default]
    Mp4,
    /// Matroska container.
    Mkv,
}

impl VideoFormat {
    /// Returns the file extension for this container.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
        }
    }
}

impl std::fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for VideoFormat {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "mkv" => Ok(Self::Mkv),
            _ => Err(ParseOptionError::new("video format", s, "mp4, mkv")),
        }
    }
}

/// Maximum vertical resolution for video downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VideoQuality {
    /// Up to 360 lines.
    #[serde(rename = "360p")]
    P360,
    /// Up to 480 lines.
    #[serde(rename = "480p")]
    P480,
    /// Up to 720 lines.
    #[default]
    #[serde(rename = "720p")]
    P720,
    /// Up to 1080 lines.
    #[serde(rename = "1080p")]
    P1080,
}

impl VideoQuality {
    /// Returns the maximum frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        match self {
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    /// Returns the quality as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }

    /// Returns all available qualities, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::P360, Self::P480, Self::P720, Self::P1080]
    }
}

impl std::fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoQuality {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('p') {
            "360" => Ok(Self::P360),
            "480" => Ok(Self::P480),
            "720" => Ok(Self::P720),
            "1080" => Ok(Self::P1080),
            _ => Err(ParseOptionError::new(
                "video quality",
                s,
                "360p, 480p, 720p, 1080p",
            )),
        }
    }
}

/// Quality and container choices for a job.
///
/// Audio and video options are mutually exclusive, so the kind is implied by
/// the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaOptions {
    /// Extract audio to mp3 at the given bitrate.
    Audio {
        /// Target bitrate.
        quality: AudioQuality,
    },
    /// Download video merged into the given container.
    Video {
        /// Output container.
        format: VideoFormat,
        /// Maximum resolution.
        quality: VideoQuality,
    },
}

impl MediaOptions {
    /// Returns the media kind implied by these options.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self {
            Self::Audio { .. } => MediaKind::Audio,
            Self::Video { .. } => MediaKind::Video,
        }
    }

    /// Returns the extension of the file the engine produces.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Audio { .. } => "mp3",
            Self::Video { format, .. } => format.extension(),
        }
    }

    /// Returns true for audio extraction.
    #[must_use]
    pub const fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_quality_parse() {
        assert_eq!("320".parse::<AudioQuality>().unwrap(), AudioQuality::Kbps320);
        assert_eq!("192k".parse::<AudioQuality>().unwrap(), AudioQuality::Kbps192);
        assert_eq!("128kbps".parse::<AudioQuality>().unwrap(), AudioQuality::Kbps128);
        assert!("256".parse::<AudioQuality>().is_err());
    }

    #[test]
    fn test_video_quality_parse() {
        assert_eq!("720p".parse::<VideoQuality>().unwrap(), VideoQuality::P720);
        assert_eq!("1080".parse::<VideoQuality>().unwrap(), VideoQuality::P1080);
        assert!("4k".parse::<VideoQuality>().is_err());
    }

    #[test]
    fn test_video_format_parse() {
        assert_eq!("MKV".parse::<VideoFormat>().unwrap(), VideoFormat::Mkv);
        assert!("avi".parse::<VideoFormat>().is_err());
    }

    #[test]
    fn test_serde_names_match_config_values() {
        assert_eq!(serde_json::to_string(&AudioQuality::Kbps192).unwrap(), "\"192\"");
        assert_eq!(serde_json::to_string(&VideoQuality::P480).unwrap(), "\"480p\"");
        assert_eq!(serde_json::to_string(&VideoFormat::Mkv).unwrap(), "\"mkv\"");
        assert_eq!(serde_json::to_string(&MediaKind::Audio).unwrap(), "\"audio\"");
    }

    #[test]
    fn test_options_kind_and_extension() {
        let audio = MediaOptions::Audio {
            quality: AudioQuality::Kbps320,
        };
        let video = MediaOptions::Video {
            format: VideoFormat::Mkv,
            quality: VideoQuality::P1080,
        };
        assert_eq!(audio.kind(), MediaKind::Audio);
        assert_eq!(audio.extension(), "mp3");
        assert_eq!(video.kind(), MediaKind::Video);
        assert_eq!(video.extension(), "mkv");
    }
}
