//! Error types for list loading and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ListSource;

/// Status reported when a manifest body is not a JSON array.
pub const MALFORMED_MANIFEST_CODE: u16 = 400;

/// Status reported when no HTTP response was received at all.
pub const NO_RESPONSE_CODE: u16 = 0;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that abort a load cycle.
///
/// Failures of individual level documents never show up here; those entries
/// are dropped from the list instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The availability probe against the manifest URL did not succeed.
    #[error("probe of {url} failed with status {code}")]
    ProbeFailed { url: String, code: u16 },

    /// The manifest request returned a non-success response.
    #[error("manifest request to {url} failed with status {code}")]
    ManifestFailed { url: String, code: u16 },

    /// The manifest body was not a JSON array.
    #[error("manifest at {url} is malformed: {reason}")]
    MalformedManifest { url: String, reason: String },

    /// A newer load for the same source replaced this one.
    #[error("load of {list} was superseded by a newer load")]
    Abandoned { list: ListSource },

    /// The loader was created outside a Tokio runtime.
    #[error("no Tokio runtime available to drive list loading")]
    NoRuntime,
}

impl LoadError {
    /// The integer code handed to failure callbacks.
    ///
    /// `Abandoned` and `NoRuntime` never reach a failure callback and share
    /// [`NO_RESPONSE_CODE`]; use [`LoadError::is_reported`] to tell them apart
    /// from a host that did not answer.
    pub fn code(&self) -> u16 {
        match self {
            LoadError::ProbeFailed { code, .. } | LoadError::ManifestFailed { code, .. } => *code,
            LoadError::MalformedManifest { .. } => MALFORMED_MANIFEST_CODE,
            LoadError::Abandoned { .. } | LoadError::NoRuntime => NO_RESPONSE_CODE,
        }
    }

    /// Returns true for errors that a failure callback receives as a code.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            LoadError::ProbeFailed { .. }
                | LoadError::ManifestFailed { .. }
                | LoadError::MalformedManifest { .. }
        )
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// The configuration text is not valid INI.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A setting holds a value that cannot be used.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_manifest_reports_400() {
        let err = LoadError::MalformedManifest {
            url: "http://example.com/_list.json".to_string(),
            reason: "expected a JSON array".to_string(),
        };
        assert_eq!(err.code(), 400);
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_http_failures_report_their_status() {
        let probe = LoadError::ProbeFailed {
            url: "u".to_string(),
            code: 404,
        };
        let manifest = LoadError::ManifestFailed {
            url: "u".to_string(),
            code: 503,
        };
        assert_eq!(probe.code(), 404);
        assert_eq!(manifest.code(), 503);
    }

    #[test]
    fn test_abandoned_display_names_source() {
        let err = LoadError::Abandoned {
            list: ListSource::TslPlus,
        };
        assert!(err.to_string().contains("TSL+"));
        assert_eq!(err.code(), NO_RESPONSE_CODE);
        assert!(!err.is_reported());
    }

    #[test]
    fn test_unreachable_host_is_reported_with_zero() {
        let unreachable = LoadError::ProbeFailed {
            url: "u".to_string(),
            code: NO_RESPONSE_CODE,
        };
        assert!(unreachable.is_reported());
        assert!(!LoadError::NoRuntime.is_reported());
        assert_eq!(unreachable.code(), LoadError::NoRuntime.code());
    }
}
