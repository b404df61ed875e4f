//! Entry store error types
//!
//! Defines all errors that can occur in the storage layer.

use thiserror::Error;

/// Errors that can occur in the entry store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input rejected before anything was written
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Persisted data is damaged (checksum mismatch, bad envelope, etc.)
    #[error("Corrupt data in '{key}': {reason}")]
    Corruption { key: String, reason: String },

    /// Persisted data was written by a newer format version
    #[error("Unsupported format version {found} in '{key}' (supported up to {supported})")]
    UnsupportedVersion {
        key: String,
        found: u32,
        supported: u32,
    },

    /// Envelope holds a different record kind than the key expects
    #[error("Key '{key}' holds '{found}' records, expected '{expected}'")]
    KindMismatch {
        key: String,
        expected: String,
        found: String,
    },

    /// Substrate refused the write because the byte quota would be exceeded
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { key: String, needed: u64, limit: u64 },

    /// Key contains characters the substrate cannot store
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Rejected user input. The message is meant to be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mood must be between 1 and 5, got {0}")]
    MoodOutOfRange(i64),

    #[error("Please write something before saving.")]
    EmptyContent,

    #[error("Emotion intensity must be between 1 and 10, got {0}")]
    IntensityOutOfRange(i64),

    #[error("Please fill in at least the situation, emotion, and automatic thought fields.")]
    IncompleteThoughtRecord,

    #[error("Please enter a thought and select at least one cognitive distortion.")]
    IncompleteDistortionRecord,

    #[error("Please enter an activity name and scheduled time.")]
    IncompleteActivity,

    #[error("Please add at least one activity to your schedule.")]
    NoActivities,

    #[error("Please interact with the check-in before saving.")]
    EmptySession,

    #[error("Please write a review before saving.")]
    EmptyReview,
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
