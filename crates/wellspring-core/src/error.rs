//! Error types for wellspring-core.
//!
//! Each domain surfaces its own thiserror enum. Analytics code deliberately
//! avoids most of these: per the degradation policy, a missing or corrupt
//! collection is treated as empty, never surfaced as an error.

use std::path::PathBuf;
use thiserror::Error;

/// Event-store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Validation errors.
///
/// The only one of these the UI ever sees is a rejected exercise
/// definition ("could not start a session").
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Exercise has no usable duration
    #[error("Exercise '{exercise}' has zero total duration")]
    ZeroDuration { exercise: String },

    /// Breathing pattern with all-zero phases
    #[error("Breathing pattern for '{exercise}' has no non-zero phase")]
    EmptyPattern { exercise: String },

    /// Mindfulness exercise with no steps
    #[error("Mindfulness exercise '{exercise}' has no steps")]
    NoSteps { exercise: String },

    /// A mindfulness step with zero duration
    #[error("Step '{step}' of '{exercise}' has zero duration")]
    ZeroLengthStep { exercise: String, step: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}
