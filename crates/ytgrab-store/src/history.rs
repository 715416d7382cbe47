//! Bounded newest-first history of completed downloads.

use crate::{Result, StoreError, StorePaths};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use ytgrab_types::MediaKind;

/// Maximum number of entries kept in the history.
pub const HISTORY_LIMIT: usize = 100;

/// One completed download. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    url: String,
    title: String,
    #[serde(rename = "format")]
    kind: MediaKind,
    path: PathBuf,
    #[serde(rename = "date", with = "date_format")]
    timestamp: NaiveDateTime,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current local time.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        kind: MediaKind,
        path: PathBuf,
    ) -> Self {
        Self::with_timestamp(url, title, kind, path, Local::now().naive_local())
    }

    /// Creates an entry with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(
        url: impl Into<String>,
        title: impl Into<String>,
        kind: MediaKind,
        path: PathBuf,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            kind,
            path,
            timestamp,
        }
    }

    /// Returns the source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the recorded title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the download was audio or video.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Returns the path of the produced file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns when the download finished.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// On-disk layout: `{ "downloads": [ ... ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    downloads: Vec<HistoryEntry>,
}

/// Append-only bounded log of past downloads, persisted as one JSON file.
///
/// Every operation is a whole-file read-modify-write serialized by one
/// mutex, so appends from a worker and reads or clears from a UI never
/// interleave within a process. Cross-process access is not coordinated.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryLog {
    /// Creates a log stored at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a log at the history location of `paths`.
    #[must_use]
    pub fn open(paths: &StorePaths) -> Self {
        Self::new(paths.history_file())
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts `entry` at the head and drops entries beyond the limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written.
    pub fn append(&self, entry: HistoryEntry) -> Result<()> {
        let _guard = self.guard();
        let mut doc = self.load()?;
        doc.downloads.insert(0, entry);
        doc.downloads.truncate(HISTORY_LIMIT);
        debug!(path = %self.path.display(), entries = doc.downloads.len(), "history appended");
        self.save(&doc)
    }

    /// Returns up to `n` entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn recent(&self, n: usize) -> Result<Vec<HistoryEntry>> {
        let _guard = self.guard();
        let mut doc = self.load()?;
        doc.downloads.truncate(n);
        Ok(doc.downloads)
    }

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.guard();
        self.save(&HistoryDocument::default())
    }

    // Guards file access only; a poisoned lock carries no state.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> Result<HistoryDocument> {
        if !self.path.exists() {
            return Ok(HistoryDocument::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadFile {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| StoreError::ParseJson {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, doc: &HistoryDocument) -> Result<()> {
        write_json(&self.path, doc)
    }
}

/// Writes `value` as pretty JSON, creating parent directories and replacing
/// the target through a sibling temporary file.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StoreError::WriteFile {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| StoreError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

mod date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub(super) fn serialize<S: Serializer>(
        date: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(i: usize) -> HistoryEntry {
        HistoryEntry::new(
            format!("https://youtu.be/video{i}"),
            format!("Title {i}"),
            MediaKind::Audio,
            PathBuf::from(format!("/music/Title {i}.mp3")),
        )
    }

    fn temp_log(dir: &TempDir) -> HistoryLog {
        HistoryLog::new(dir.path().join("history.json"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);
        assert!(log.recent(10).unwrap().is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_append_is_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);

        log.append(entry(1)).unwrap();
        log.append(entry(2)).unwrap();

        let recent = log.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title(), "Title 2");
        assert_eq!(recent[1].title(), "Title 1");
    }

    #[test]
    fn test_caps_at_limit() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);

        for i in 1..=101 {
            log.append(entry(i)).unwrap();
        }

        let all = log.recent(usize::MAX).unwrap();
        assert_eq!(all.len(), HISTORY_LIMIT);
        assert_eq!(log.recent(1).unwrap()[0].title(), "Title 101");
        assert_eq!(all.last().unwrap().title(), "Title 2");
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(temp_log(&temp_dir));

        let holder = Arc::clone(&log);
        let _ = std::thread::spawn(move || {
            let _guard = holder.lock.lock().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(log.lock.is_poisoned());

        log.append(entry(1)).unwrap();
        assert_eq!(log.recent(10).unwrap().len(), 1);
        log.clear().unwrap();
        assert!(log.recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_recent_is_restartable() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);
        for i in 0..5 {
            log.append(entry(i)).unwrap();
        }

        assert_eq!(log.recent(3).unwrap(), log.recent(3).unwrap());
        assert_eq!(log.recent(3).unwrap().len(), 3);
        assert_eq!(log.recent(0).unwrap().len(), 0);
        assert_eq!(log.recent(50).unwrap().len(), 5);
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);
        log.append(entry(1)).unwrap();

        log.clear().unwrap();
        assert!(log.recent(10).unwrap().is_empty());

        log.append(entry(2)).unwrap();
        assert_eq!(log.recent(10).unwrap().len(), 1);
    }

    #[test]
    fn test_persisted_format() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);
        let timestamp =
            NaiveDateTime::parse_from_str("2024-05-01 12:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        log.append(HistoryEntry::with_timestamp(
            "https://youtu.be/abc",
            "Song",
            MediaKind::Video,
            PathBuf::from("/videos/Song.mp4"),
            timestamp,
        ))
        .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let first = &value["downloads"][0];
        assert_eq!(first["url"], "https://youtu.be/abc");
        assert_eq!(first["title"], "Song");
        assert_eq!(first["format"], "video");
        assert_eq!(first["path"], "/videos/Song.mp4");
        assert_eq!(first["date"], "2024-05-01 12:30:00");

        let reloaded = HistoryLog::new(log.path()).recent(1).unwrap();
        assert_eq!(reloaded[0].timestamp(), timestamp);
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log = HistoryLog::new(temp_dir.path().join("nested/dir/history.json"));
        log.append(entry(1)).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_log(&temp_dir);
        fs::write(log.path(), "{ not json").unwrap();

        assert!(matches!(log.recent(1), Err(StoreError::ParseJson { .. })));
        assert!(matches!(log.append(entry(1)), Err(StoreError::ParseJson { .. })));
    }

    #[test]
    fn test_concurrent_appends_are_serialized() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(temp_log(&temp_dir));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..5 {
                        log.append(entry(t * 10 + i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.recent(usize::MAX).unwrap().len(), 40);
    }
}
