//! Notifications sent from a running job to its consumer.

use crate::{JobId, JobState, PostProcessWarning};
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;
use ytgrab_types::ProgressSnapshot;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Sending half of a job event channel.
pub type EventSender = mpsc::Sender<JobEvent>;

/// Receiving half of a job event channel.
pub type EventReceiver = mpsc::Receiver<JobEvent>;

/// Creates a bounded event channel.
///
/// Progress events are dropped while the channel is full. State, info and
/// terminal events are never dropped: the job waits for room, so a consumer
/// that keeps the receiver alive must keep reading or the job stalls at its
/// next lifecycle event. Dropping the receiver lets the job run to completion
/// without delivering anything.
#[must_use]
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity)
}

/// The step a failed job was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// Metadata extraction.
    Extraction,
    /// Transfer and transcoding.
    Fetch,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extraction => write!(f, "extraction"),
            Self::Fetch => write!(f, "fetch"),
        }
    }
}

/// An event emitted by a running job.
///
/// Every job emits exactly one terminal event (`Succeeded`, `Failed` or
/// `Cancelled`) and nothing after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// The job entered a non-terminal state.
    State {
        /// Job id.
        id: JobId,
        /// New state.
        state: JobState,
    },
    /// Extraction resolved the media metadata.
    Info {
        /// Job id.
        id: JobId,
        /// Media title.
        title: String,
        /// Thumbnail URL, when the engine reported one.
        thumbnail_url: Option<String>,
    },
    /// Transfer progress.
    Progress {
        /// Job id.
        id: JobId,
        /// Latest snapshot.
        snapshot: ProgressSnapshot,
    },
    /// The job produced a file.
    Succeeded {
        /// Job id.
        id: JobId,
        /// Final file path.
        path: PathBuf,
        /// Non-fatal post-processing problems.
        warnings: Vec<PostProcessWarning>,
    },
    /// The job failed.
    Failed {
        /// Job id.
        id: JobId,
        /// Step that failed.
        stage: FailureStage,
        /// Engine message, verbatim.
        message: String,
    },
    /// The job was cancelled.
    Cancelled {
        /// Job id.
        id: JobId,
    },
}

impl JobEvent {
    /// Returns the id of the job that emitted this event.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        match self {
            Self::State { id, .. }
            | Self::Info { id, .. }
            | Self::Progress { id, .. }
            | Self::Succeeded { id, .. }
            | Self::Failed { id, .. }
            | Self::Cancelled { id } => *id,
        }
    }

    /// Returns true for the single final event of a job.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_terminal_events() {
        let id = Uuid::new_v4();
        assert!(JobEvent::Cancelled { id }.is_terminal());
        assert!(
            JobEvent::Failed {
                id,
                stage: FailureStage::Fetch,
                message: "boom".to_string(),
            }
            .is_terminal()
        );
        assert!(
            !JobEvent::State {
                id,
                state: JobState::Fetching,
            }
            .is_terminal()
        );
        assert!(
            !JobEvent::Progress {
                id,
                snapshot: ProgressSnapshot::default(),
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_job_id() {
        let id = Uuid::new_v4();
        let event = JobEvent::Info {
            id,
            title: "Song".to_string(),
            thumbnail_url: None,
        };
        assert_eq!(event.job_id(), id);
    }

    #[test]
    fn test_event_serialization() {
        let id = Uuid::nil();
        let event = JobEvent::Failed {
            id,
            stage: FailureStage::Extraction,
            message: "ERROR: private video".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "failed");
        assert_eq!(json["stage"], "extraction");
        assert_eq!(json["message"], "ERROR: private video");
    }

    #[tokio::test]
    async fn test_full_channel_rejects_try_send() {
        let (tx, mut rx) = event_channel(1);
        let id = Uuid::new_v4();
        tx.try_send(JobEvent::Cancelled { id }).unwrap();
        assert!(
            tx.try_send(JobEvent::Progress {
                id,
                snapshot: ProgressSnapshot::default(),
            })
            .is_err()
        );
        assert_eq!(rx.recv().await, Some(JobEvent::Cancelled { id }));
    }
}
