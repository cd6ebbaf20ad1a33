//! Submission Data Structures
//!
//! The contact-form payload, the record wrapping it in the local queue, and
//! the acknowledgement the remote API sends back.

use crate::shared::error::SharedError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic the user picked on the contact form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Support,
    Sales,
    Feedback,
}

impl Category {
    /// All categories, in form order
    pub const ALL: [Category; 4] = [
        Category::General,
        Category::Support,
        Category::Sales,
        Category::Feedback,
    ];

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General inquiry",
            Category::Support => "Technical support",
            Category::Sales => "Sales",
            Category::Feedback => "Feedback",
        }
    }

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Support => "support",
            Category::Sales => "sales",
            Category::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-entered form payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFields {
    /// First name
    pub name: String,
    /// Last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Selected category
    pub category: Category,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SubmissionFields {
    /// Create a payload without notes
    pub fn new(
        name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            last_name: last_name.into(),
            email: email.into(),
            category,
            notes: None,
        }
    }

    /// Attach notes; blank notes are dropped
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }

    /// Apply the contact form rules: required names and a well-formed email
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.name.trim().is_empty() {
            return Err(SharedError::validation("name", "Name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(SharedError::validation("lastName", "Last name is required"));
        }
        if !is_valid_email(&self.email) {
            return Err(SharedError::validation("email", "Email address is not valid"));
        }
        Ok(())
    }

    /// "Name Last" for list views
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.last_name.trim())
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// A submission held in the local queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Store-assigned identifier; `None` until persisted
    pub id: Option<i64>,
    /// Form payload
    pub fields: SubmissionFields,
    /// Milliseconds since the Unix epoch, set when persisted
    pub created_at: i64,
    /// Whether the remote API confirmed delivery
    pub synced: bool,
}

impl SubmissionRecord {
    /// Wrap fresh fields in an unsynced, unpersisted record
    pub fn new(fields: SubmissionFields, created_at: i64) -> Self {
        Self {
            id: None,
            fields,
            created_at,
            synced: false,
        }
    }

    /// Creation time as a UTC datetime
    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.created_at)
    }
}

/// Success payload returned by the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerAck {
    /// Identifier assigned by the server
    pub id: i64,
}
