//! Error types for the fallible edges of the crate
//!
//! The engines themselves never fail: degenerate input degrades to safe
//! defaults. Errors only come from loading configuration and from the
//! storage collaborator.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FatigueFitError>;

#[derive(Debug, Error)]
pub enum FatigueFitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Tuning configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be within 0..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        max: f32,
    },

    #[error("{lower} ({lower_value}) must not exceed {upper} ({upper_value})")]
    Ordering {
        lower: &'static str,
        lower_value: f32,
        upper: &'static str,
        upper_value: f32,
    },

    #[error("Effort factors must not decrease as RPE rises")]
    EffortNotMonotonic,

    #[error("Reset weekday must be 0-6 (0 = Sunday), got {0}")]
    Weekday(u8),
}

/// Storage collaborator failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted store {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
