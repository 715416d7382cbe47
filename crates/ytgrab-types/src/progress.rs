//! Progress snapshots reported while a job is fetching.

use serde::{Deserialize, Serialize};

/// Placeholder shown when the engine does not report speed or ETA.
pub const NOT_AVAILABLE: &str = "N/A";

/// A structured view of one engine progress event.
///
/// The percentage is display-only: engines may restart a fragment, so
/// consecutive snapshots are not guaranteed to increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completion percentage in `0..=100`.
    pub percent: u8,
    /// Transfer speed as reported by the engine.
    pub speed: String,
    /// Estimated time remaining as reported by the engine.
    pub eta: String,
}

impl ProgressSnapshot {
    /// Creates a snapshot, clamping `percent` to 100.
    #[must_use]
    pub fn new(percent: u8, speed: impl Into<String>, eta: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            speed: speed.into(),
            eta: eta.into(),
        }
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::new(0, NOT_AVAILABLE, NOT_AVAILABLE)
    }
}

impl std::fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}% | {} | ETA {}", self.percent, self.speed, self.eta)
    }
}
