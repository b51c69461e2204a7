//! Error types for netsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Only range and export
//! errors are visible above the scanning core; probe failures are converted
//! to [`ProbeOutcome`](crate::scanner::ProbeOutcome) variants at the probe
//! boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::TargetError;

/// A network or port specification could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid network specification: {0}")]
    InvalidNetwork(String),

    #[error("prefix length {prefix} is out of range (0-{max})")]
    PrefixOutOfRange { prefix: u32, max: u8 },

    #[error("invalid port number: {0}")]
    InvalidPort(String),

    #[error("port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u32),

    #[error("invalid port range: start ({0}) > end ({1})")]
    InvertedRange(u32, u32),

    #[error("empty port specification")]
    Empty,

    #[error("network too large: {0} hosts (max: {1})")]
    TooLarge(u128, u128),
}

/// Failure of a single probe.
///
/// Never leaves the prober; classified into an outcome instead.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    Refused,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writing or re-reading an exported report failed.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed report: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Settings could not be located or parsed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    InvalidValue(String),
}

/// Errors surfaced by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type alias for range parsing.
pub type RangeResult<T> = Result<T, RangeError>;

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI handlers.
pub type CliResult<T> = Result<T, CliError>;
