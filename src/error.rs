use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A single malformed token in the sensor filter string.
///
/// These never abort parsing; the offending token is logged and skipped.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("expected 4 parts (name,unit,maximum,minimum), got {0}")]
    FieldCount(usize),
    #[error("sensor name cannot be empty")]
    EmptyName,
    #[error("sensor unit cannot be empty")]
    EmptyUnit,
    #[error("invalid maximum value '{0}'")]
    InvalidMaximum(String),
    #[error("invalid minimum value '{0}'")]
    InvalidMinimum(String),
    #[error("minimum value ({minimum}) must be less than maximum value ({maximum})")]
    InvertedRange { minimum: f64, maximum: f64 },
}

/// Failure of the temperature source for one attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("sensor source panicked: {0}")]
    Panic(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to obtain a value for one generic sensor this cycle.
#[derive(Debug, Error)]
pub enum GenericSensorError {
    #[error("sensor file not found at {0} - create a file or symlink with the sensor value")]
    NotFound(PathBuf),
    #[error("failed to read sensor from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to execute sensor script {path}: {reason}")]
    Exec { path: PathBuf, reason: String },
    #[error("sensor script {path} did not finish within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },
    #[error("sensor script {path} exited with {status}")]
    ExitStatus { path: PathBuf, status: String },
    #[error("failed to parse sensor value '{value}' from {path}")]
    Parse { value: String, path: PathBuf },
}
