//! Unified error hierarchy for runsense
//!
//! Degraded inputs (sparse or empty session history) never error; the
//! calculators fall back to conservative defaults instead. The one hard
//! error a caller must surface is an aerobic index outside the valid
//! physiological domain being fed to pace derivation.

use thiserror::Error;

use crate::metrics::MetricsError;
use crate::sessions::ImportError;

/// Top-level error type for all runsense operations
#[derive(Debug, Error)]
pub enum RunSenseError {
    /// Fitness-metric calculation errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Session log import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for runsense operations
pub type Result<T> = std::result::Result<T, RunSenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_aerobic_index_wraps() {
        let err: RunSenseError = MetricsError::InvalidAerobicIndex { value: 120.0 }.into();
        assert!(err.to_string().contains("120"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = RunSenseError::Configuration("bad key".to_string());
        assert!(err.to_string().contains("bad key"));
    }
}
