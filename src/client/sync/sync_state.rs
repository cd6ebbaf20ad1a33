//! # Sync State
//!
//! User-facing status of the most recent submission attempt, and the
//! outcome types returned by the coordinator.

use crate::client::error::OfflineError;
use crate::shared::ServerAck;
use std::fmt;

/// Where a submission attempt currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    /// Offline: stored for a later resync
    QueuedLocally,
    /// Resync of a queued record in flight
    Syncing,
    Delivered,
    Failed,
}

impl SubmissionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionPhase::QueuedLocally | SubmissionPhase::Delivered | SubmissionPhase::Failed
        )
    }
}

/// Successful result of [`SyncCoordinator::submit`](super::SyncCoordinator::submit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Posted to the remote API
    Delivered(ServerAck),
    /// Stored locally because the device is offline
    QueuedLocally { id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Message shown next to the form after an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Delivered { server_id: i64 },
    SavedLocally { id: i64 },
    Failed { message: String },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::Delivered { .. } => Severity::Success,
            Notice::SavedLocally { .. } => Severity::Warning,
            Notice::Failed { .. } => Severity::Error,
        }
    }

    pub(crate) fn from_error(err: &OfflineError) -> Self {
        Notice::Failed {
            message: err.user_message(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Delivered { .. } => write!(f, "Form sent successfully."),
            Notice::SavedLocally { .. } => write!(
                f,
                "Form saved locally. You can sync it manually from the offline data section."
            ),
            Notice::Failed { message } => f.write_str(message),
        }
    }
}

/// Observable status of the submission flow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionStatus {
    pub phase: SubmissionPhase,
    pub is_loading: bool,
    /// Acknowledgement of the latest delivered submission
    pub delivered: Option<ServerAck>,
    pub notice: Option<Notice>,
}

impl SubmissionStatus {
    /// Whether the form should be cleared: delivered or safely queued
    pub fn should_reset_form(&self) -> bool {
        matches!(
            self.notice,
            Some(Notice::Delivered { .. }) | Some(Notice::SavedLocally { .. })
        )
    }
}

/// Result of resyncing the whole queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records confirmed and purged
    pub delivered: Vec<i64>,
    /// Records left queued after a failed attempt
    pub failed: Vec<(i64, OfflineError)>,
    /// Records skipped because another sync held them
    pub skipped: Vec<i64>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
