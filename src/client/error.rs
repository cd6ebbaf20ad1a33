//! Offline Queue Error Types
//!
//! Errors produced by the queue store, the submission gateway and the sync
//! coordinator.
//!
//! # Error Categories
//!
//! - `StorageUnavailable` / `StorageWrite` - the local database could not be
//!   opened, read or written
//! - `NotFound` - an operation referenced a record that is no longer stored
//! - `Gateway` - the remote API rejected the submission or could not be reached
//! - `NoConnection` - a resync was attempted while offline
//! - `SyncInProgress` - a resync for the same record is already running
//! - `Invalid` - the payload failed the form rules

use crate::shared::SharedError;
use thiserror::Error;

/// Errors raised by the remote submission endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The server answered with a non-success status
    #[error("Server responded with {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The server answered 2xx but the body carried no usable identifier
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Human-readable error message
        message: String,
    },
}

impl GatewayError {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a new invalid-response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the offline queue and sync coordinator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OfflineError {
    /// The local database cannot be opened or read
    #[error("Local storage unavailable: {message}")]
    StorageUnavailable {
        /// Human-readable error message
        message: String,
    },

    /// A write to the local database failed
    #[error("Local storage write failed: {message}")]
    StorageWrite {
        /// Human-readable error message
        message: String,
    },

    /// No record with this identifier is stored
    #[error("Submission {id} not found")]
    NotFound {
        /// Requested record identifier
        id: i64,
    },

    /// The remote API rejected or never received the submission
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A resync was requested while offline
    #[error("No network connection")]
    NoConnection,

    /// Another resync of the same record has not finished yet
    #[error("Submission {id} is already being synced")]
    SyncInProgress {
        /// Record identifier
        id: i64,
    },

    /// The payload failed validation
    #[error(transparent)]
    Invalid(#[from] SharedError),
}

impl OfflineError {
    /// Create a new storage-unavailable error
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable {
            message: message.to_string(),
        }
    }

    /// Create a new storage-write error
    pub fn write(message: impl std::fmt::Display) -> Self {
        Self::StorageWrite {
            message: message.to_string(),
        }
    }

    /// Whether the failure came from local persistence
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::StorageWrite { .. }
        )
    }

    /// Message suitable for showing to the person filling the form
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageUnavailable { .. } | Self::StorageWrite { .. } => {
                "Could not save the form locally.".to_string()
            }
            Self::NotFound { .. } => "This form is no longer stored on this device.".to_string(),
            Self::Gateway(_) => "Error sending the form. Please try again.".to_string(),
            Self::NoConnection => {
                "No internet connection. Please connect and try again.".to_string()
            }
            Self::SyncInProgress { .. } => "This form is already being sent.".to_string(),
            Self::Invalid(err) => err.to_string(),
        }
    }
}
