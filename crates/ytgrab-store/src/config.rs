//! Flat key-value configuration file.

use crate::history::write_json;
use crate::paths::default_download_dir;
use crate::{Result, StoreError, StorePaths};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use ytgrab_types::{AudioQuality, MediaOptions, VideoFormat, VideoQuality};

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme.
    #[default]
    Dark,
    /// Light theme.
    Light,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(format!("invalid theme '{s}', expected one of: dark, light")),
        }
    }
}

/// Typed view of the configuration document.
///
/// Keys the application does not recognize are kept in [`AppConfig::extra`]
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory downloads are written to.
    pub default_path: PathBuf,
    /// Bitrate for audio downloads.
    pub audio_quality: AudioQuality,
    /// UI theme.
    pub theme: Theme,
    /// Container for video downloads.
    pub video_format: VideoFormat,
    /// Maximum resolution for video downloads.
    pub video_quality: VideoQuality,
    /// Whether to write tags into audio files.
    pub apply_metadata: bool,
    /// Whether to embed the thumbnail as cover art.
    pub save_thumbnails: bool,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_path: default_download_dir(),
            audio_quality: AudioQuality::default(),
            theme: Theme::default(),
            video_format: VideoFormat::default(),
            video_quality: VideoQuality::default(),
            apply_metadata: true,
            save_thumbnails: true,
            extra: Map::new(),
        }
    }
}

impl AppConfig {
    /// Keys with a typed meaning.
    pub const RECOGNIZED_KEYS: [&'static str; 7] = [
        "default_path",
        "audio_quality",
        "theme",
        "video_format",
        "video_quality",
        "apply_metadata",
        "save_thumbnails",
    ];

    /// Returns the audio options selected by this configuration.
    #[must_use]
    pub const fn audio_options(&self) -> MediaOptions {
        MediaOptions::Audio {
            quality: self.audio_quality,
        }
    }

    /// Returns the video options selected by this configuration.
    #[must_use]
    pub const fn video_options(&self) -> MediaOptions {
        MediaOptions::Video {
            format: self.video_format,
            quality: self.video_quality,
        }
    }

    /// Returns the value stored under `key`, recognized or not.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }

    /// Sets `key` from its textual form.
    ///
    /// Recognized keys are validated; other keys are stored as JSON when the
    /// text parses as JSON and as a string otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidValue`] if a recognized key rejects the value.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let invalid = |reason: String| StoreError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason,
        };

        match key {
            "default_path" => self.default_path = PathBuf::from(raw),
            "audio_quality" => {
                self.audio_quality = raw.parse().map_err(|e| invalid(format!("{e}")))?;
            }
            "theme" => self.theme = raw.parse().map_err(invalid)?,
            "video_format" => {
                self.video_format = raw.parse().map_err(|e| invalid(format!("{e}")))?;
            }
            "video_quality" => {
                self.video_quality = raw.parse().map_err(|e| invalid(format!("{e}")))?;
            }
            "apply_metadata" | "save_thumbnails" => {
                let flag = parse_bool(raw)
                    .ok_or_else(|| invalid("expected true or false".to_string()))?;
                if key == "apply_metadata" {
                    self.apply_metadata = flag;
                } else {
                    self.save_thumbnails = flag;
                }
            }
            _ => {
                let value = serde_json::from_str(raw)
                    .unwrap_or_else(|_| Value::String(raw.to_string()));
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Returns true if `value` is acceptable for the recognized `key`.
fn accepts(key: &str, value: &Value) -> bool {
    match key {
        "default_path" => value.is_string(),
        "audio_quality" => AudioQuality::deserialize(value).is_ok(),
        "theme" => Theme::deserialize(value).is_ok(),
        "video_format" => VideoFormat::deserialize(value).is_ok(),
        "video_quality" => VideoQuality::deserialize(value).is_ok(),
        "apply_metadata" | "save_thumbnails" => value.is_boolean(),
        _ => true,
    }
}

/// Reads and writes the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the configuration location of `paths`.
    #[must_use]
    pub fn open(paths: &StorePaths) -> Self {
        Self::new(paths.config_file())
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing file yields the defaults. Recognized keys that are missing
    /// or hold an invalid value are backfilled with their defaults; unknown
    /// keys are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadFile {
            path: self.path.clone(),
            source: e,
        })?;
        let mut map: Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| StoreError::ParseJson {
                path: self.path.clone(),
                source: e,
            })?;

        backfill(&mut map)?;

        serde_json::from_value(Value::Object(map)).map_err(|e| StoreError::ParseJson {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Writes `config` to the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        write_json(&self.path, config)
    }

    /// Loads the configuration, applies `change` and saves the result.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, `change` or saving fails.
    pub fn update<F>(&self, change: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig) -> Result<()>,
    {
        let mut config = self.load()?;
        change(&mut config)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Replaces the file with the defaults, dropping unknown keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn reset(&self) -> Result<AppConfig> {
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}

fn backfill(map: &mut Map<String, Value>) -> Result<()> {
    let Value::Object(defaults) = serde_json::to_value(AppConfig::default())? else {
        return Ok(());
    };

    for (key, default) in defaults {
        match map.get(&key) {
            None => {
                map.insert(key, default);
            }
            Some(value) if !accepts(&key, value) => {
                warn!(key = %key, value = %value, "invalid configuration value replaced by default");
                map.insert(key, default);
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("config.json"))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_store(&temp_dir).load().unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.audio_quality, AudioQuality::Kbps320);
        assert_eq!(config.video_quality, VideoQuality::P720);
        assert!(config.apply_metadata);
    }

    #[test]
    fn test_backfills_missing_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_store(&temp_dir);
        fs::write(store.path(), r#"{"audio_quality": "128", "theme": "light"}"#).unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.audio_quality, AudioQuality::Kbps128);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.video_format, VideoFormat::Mp4);
        assert!(config.save_thumbnails);
    }

    #[test]
    fn test_invalid_value_replaced_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_store(&temp_dir);
        fs::write(
            store.path(),
            r#"{"video_quality": "4k", "apply_metadata": "sometimes"}"#,
        )
        .unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.video_quality, VideoQuality::P720);
        assert!(config.apply_metadata);
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_store(&temp_dir);
        fs::write(
            store.path(),
            r#"{"window_width": 800, "last_tab": "video", "theme": "dark"}"#,
        )
        .unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.extra["window_width"], 800);
        store.save(&config).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["window_width"], 800);
        assert_eq!(raw["last_tab"], "video");
        assert_eq!(raw["audio_quality"], "320");
    }

    #[test]
    fn test_not_an_object_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_store(&temp_dir);
        fs::write(store.path(), "[1, 2, 3]").unwrap();
        assert!(matches!(store.load(), Err(StoreError::ParseJson { .. })));
    }

    #[test]
    fn test_set_validates_recognized_keys() {
        let mut config = AppConfig::default();
        config.set("audio_quality", "192").unwrap();
        config.set("video_quality", "1080p").unwrap();
        config.set("apply_metadata", "false").unwrap();
        assert_eq!(config.audio_quality, AudioQuality::Kbps192);
        assert_eq!(config.video_quality, VideoQuality::P1080);
        assert!(!config.apply_metadata);

        assert!(matches!(
            config.set("video_format", "avi"),
            Err(StoreError::InvalidValue { .. })
        ));
        assert!(config.set("save_thumbnails", "maybe").is_err());
    }

    #[test]
    fn test_set_and_get_unknown_key() {
        let mut config = AppConfig::default();
        config.set("volume", "7").unwrap();
        config.set("nickname", "not json").unwrap();
        assert_eq!(config.get("volume"), Some(serde_json::json!(7)));
        assert_eq!(config.get("nickname"), Some(serde_json::json!("not json")));
        assert_eq!(config.get("theme"), Some(serde_json::json!("dark")));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_update_and_reset() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_store(&temp_dir);

        store
            .update(|config| {
                config.default_path = PathBuf::from("/music");
                config.set("custom", "1")
            })
            .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.default_path, PathBuf::from("/music"));
        assert!(loaded.extra.contains_key("custom"));

        let reset = store.reset().unwrap();
        assert!(reset.extra.is_empty());
        assert_eq!(store.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_media_options_from_config() {
        let config = AppConfig::default();
        assert!(config.audio_options().is_audio());
        assert_eq!(config.video_options().extension(), "mp4");
    }
}
