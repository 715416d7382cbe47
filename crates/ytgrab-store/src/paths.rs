//! Platform locations for stored files.

use directories::{ProjectDirs, UserDirs};
use std::path::{Path, PathBuf};

/// File name of the history document.
const HISTORY_FILE: &str = "download_history.json";

/// File name of the configuration document.
const CONFIG_FILE: &str = "config.json";

/// Locations of the history and configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    data_dir: PathBuf,
    config_dir: PathBuf,
}

impl StorePaths {
    /// Uses `dir` for both data and configuration.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            data_dir: dir.clone(),
            config_dir: dir,
        }
    }

    /// Returns the platform default locations.
    ///
    /// Uses the `directories` crate:
    /// - Linux: `~/.local/share/ytgrab/` and `~/.config/ytgrab/`
    /// - macOS: `~/Library/Application Support/ytgrab/`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\ytgrab\`
    ///
    /// Falls back to `~/.ytgrab/` if the platform location cannot be determined.
    #[must_use]
    pub fn platform_default() -> Self {
        ProjectDirs::from("", "", "ytgrab").map_or_else(
            || Self::in_dir(dirs_fallback()),
            |proj| Self {
                data_dir: proj.data_dir().to_path_buf(),
                config_dir: proj.config_dir().to_path_buf(),
            },
        )
    }

    /// Returns the directory holding the history file.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the directory holding the configuration file.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path of the history file.
    #[must_use]
    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    /// Returns the path of the configuration file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

/// Returns the user's download directory, or the home directory if unknown.
#[must_use]
pub(crate) fn default_download_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| {
            dirs.download_dir()
                .map(Path::to_path_buf)
                .or_else(|| Some(dirs.home_dir().join("Downloads")))
        })
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".ytgrab")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_file_names() {
        let paths = StorePaths::in_dir("/tmp/ytgrab");
        assert_eq!(
            paths.history_file(),
            PathBuf::from("/tmp/ytgrab/download_history.json")
        );
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/ytgrab/config.json"));
    }

    #[test]
    fn test_platform_default_is_named_after_app() {
        let paths = StorePaths::platform_default();
        assert!(paths.config_file().to_string_lossy().contains("ytgrab"));
        assert!(paths.history_file().ends_with(HISTORY_FILE));
    }
}
