//! Error types for hydrate-reminder.
//!
//! Only configuration and startup errors are fatal. Validation errors turn into
//! user alerts; storage and scheduler errors are logged and absorbed by the
//! caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::hydration::{MAX_GOAL, MIN_GOAL};

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected user input. No state is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Daily goal must be between {min} and {max} glasses (got {0})", min = MIN_GOAL, max = MAX_GOAL)]
    GoalOutOfRange(i64),

    #[error("Hour must be between 0 and 23 (got {0})")]
    HourOutOfRange(i64),

    #[error("Minute must be between 0 and 59 (got {0})")]
    MinuteOutOfRange(i64),

    #[error("No timer with id {0}")]
    UnknownTimer(i64),

    #[error("'{0}' is not a valid time, expected HH:MM")]
    InvalidTime(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unable to access store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to (de)serialize stored data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to resolve a data directory for this platform")]
    NoDataDir,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Notification permission was denied")]
    PermissionDenied,

    #[error("Notification scheduler is unavailable: {0}")]
    Unavailable(String),

    #[error("Unable to deliver notification: {0}")]
    Delivery(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
