//! Error types for portxcan.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port connection
//! failures never appear here: they are absorbed by the scan engine and only
//! show up as the absence of a result.

use crate::types::{PortError, ScanIdError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before or while setting up a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("invalid port range: {0}")]
    InvalidPortRange(#[from] PortError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scan task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors from loading or saving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from the in-memory scan registry.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("ambiguous scan id prefix '{prefix}': {matches} matches")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error(transparent)]
    InvalidId(#[from] ScanIdError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Top-level error for command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<TargetError> for CliError {
    fn from(err: TargetError) -> Self {
        Self::Scan(ScanError::from(err))
    }
}

impl From<PortError> for CliError {
    fn from(err: PortError) -> Self {
        Self::Scan(ScanError::from(err))
    }
}

pub type CliResult<T> = Result<T, CliError>;
