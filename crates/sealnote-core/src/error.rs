//! Error types for SealNote core operations.
//!
//! Every failure surfaces as a distinct variant so the UI layer can decide
//! presentation (empty editor, error banner). Messages never carry key
//! material, passphrases, or note plaintext.

use thiserror::Error;

/// Result type alias for SealNote operations.
pub type Result<T> = std::result::Result<T, SealNoteError>;

/// Core error type for SealNote operations.
#[derive(Debug, Error)]
pub enum SealNoteError {
    /// Missing or invalid key or configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The cipher or random source rejected the inputs; nothing was sealed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Persisted envelope is not in a recognized format
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authentication tag did not verify (tampered data or wrong key)
    #[error("Integrity check failed: envelope was modified or the key is wrong")]
    Integrity,

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persistence backend error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Discriminant of [`SealNoteError`], for callers that branch on the failure
/// class without matching on message payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Encryption,
    MalformedEnvelope,
    Integrity,
    InvalidInput,
    Storage,
}

impl SealNoteError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SealNoteError::Configuration(_) => ErrorKind::Configuration,
            SealNoteError::Encryption(_) => ErrorKind::Encryption,
            SealNoteError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            SealNoteError::Integrity => ErrorKind::Integrity,
            SealNoteError::InvalidInput(_) => ErrorKind::InvalidInput,
            SealNoteError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<std::io::Error> for SealNoteError {
    fn from(err: std::io::Error) -> Self {
        SealNoteError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for SealNoteError {
    fn from(err: toml::de::Error) -> Self {
        SealNoteError::Configuration(err.to_string())
    }
}
