//! Shared Module
//!
//! Platform-agnostic types used by every part of the offline queue: the
//! submission payload and record, payload errors, and configuration.

/// Submission payload and queue record
pub mod submission;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use submission::{Category, ServerAck, SubmissionFields, SubmissionRecord};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
