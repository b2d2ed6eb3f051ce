//! Error types for fs-harvest
//!
//! This module defines the error hierarchy that covers:
//! - Path resolution errors (user-supplied roots)
//! - SQLite store errors
//! - Configuration and CLI errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - name the path or store file involved
//! - Per-entry walk failures are not errors; the walker skips and counts them

use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for fs-harvest
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Path resolution errors
    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    /// Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors outside the walk (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors resolving a user-supplied path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path does not exist or cannot be resolved
    #[error("cannot resolve '{path}': {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// Path resolved but is not a directory
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },
}

/// SQLite store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error that does not fall in any other category
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// Store file unreachable or unwritable
    #[error("cannot access store '{path}': {reason}")]
    Io { path: PathBuf, reason: String },

    /// Store is locked by another process
    #[error("store '{path}' is locked - another process may be using it")]
    Locked { path: PathBuf },

    /// Store lacks the expected `files` table
    #[error("store schema error: {0}")]
    Schema(String),

    /// `init` targeting a location that already has a store
    #[error("a store already exists at '{path}'")]
    AlreadyInitialized { path: PathBuf },
}

impl StoreError {
    /// Classify a rusqlite error raised against the store at `path`
    pub fn from_sqlite(err: rusqlite::Error, path: &std::path::Path) -> Self {
        if let rusqlite::Error::SqliteFailure(ffi, ref message) = err {
            match ffi.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    return StoreError::Locked {
                        path: path.to_path_buf(),
                    };
                }
                ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::DiskFull => {
                    return StoreError::Io {
                        path: path.to_path_buf(),
                        reason: message.clone().unwrap_or_else(|| ffi.to_string()),
                    };
                }
                _ => {
                    if let Some(msg) = message {
                        if msg.starts_with("no such table") {
                            return StoreError::Schema(msg.clone());
                        }
                    }
                }
            }
        }
        StoreError::Sqlite(err)
    }

    /// True for the errors the CLI reports as "store unreachable"
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Locked { .. })
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid chunk size
    #[error("Invalid chunk size {size}: must be between {min} and {max}")]
    InvalidChunkSize { size: usize, min: usize, max: usize },

    /// Invalid result limit
    #[error("Invalid limit {limit}: must be at least 1")]
    InvalidLimit { limit: usize },

    /// No store file found by discovery
    #[error("no store found in '{start}' or any parent directory (run `fs-harvest init` first)")]
    StoreNotFound { start: PathBuf },
}

/// Result type alias for HarvestError
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;
