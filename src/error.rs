//! Error taxonomy of the DMR pipeline.
//!
//! Ingestion and parse errors are logged and absorbed by the component that
//! hits them. Capacity and output errors abort a single channel pass and are
//! reported to the caller. Invalid parameters stop the run before any work.

use std::path::PathBuf;

use thiserror::Error;

use crate::data_structs::Channel;

/// Result type alias for wavedmr operations
pub type Result<T> = std::result::Result<T, DhunterError>;

#[derive(Error, Debug)]
pub enum DhunterError {
    /// Coverage file missing or unreadable. The sample is treated as empty.
    #[error("Could not read coverage file '{}': {source}", path.display())]
    Ingestion {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input line. Only the line is skipped.
    #[error("Malformed line {line} in '{}': {reason}", path.display())]
    Parse {
        path:   PathBuf,
        line:   usize,
        reason: String,
    },

    /// A single dense row does not fit in the transform memory budget.
    #[error(
        "Chromosome {chromosome} ({channel}): a single row needs {row_bytes} \
         bytes but only {budget} bytes are usable by the transform backend"
    )]
    Capacity {
        chromosome: String,
        channel:    Channel,
        row_bytes:  u64,
        budget:     u64,
    },

    /// Result or GFF file could not be written.
    #[error("Could not write output file '{}': {source}", path.display())]
    Output {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: String,
        reason:    String,
    },

    /// Transform backend failure unrelated to capacity.
    #[error("Transform backend '{backend}' failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source:  anyhow::Error,
    },
}

impl DhunterError {
    pub fn invalid_parameter<P: Into<String>, R: Into<String>>(
        parameter: P,
        reason: R,
    ) -> Self {
        DhunterError::InvalidParameter {
            parameter: parameter.into(),
            reason:    reason.into(),
        }
    }

    pub fn output<P: Into<PathBuf>, E: Into<std::io::Error>>(
        path: P,
        source: E,
    ) -> Self {
        DhunterError::Output {
            path:   path.into(),
            source: source.into(),
        }
    }

    /// Whether the error ends the current channel pass and must be shown to
    /// the user. Ingestion and parse errors are absorbed.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            DhunterError::Ingestion { .. } | DhunterError::Parse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let error = DhunterError::invalid_parameter("dwt-level", "must be >= 1");
        let msg = format!("{error}");
        assert!(msg.contains("Invalid parameter 'dwt-level'"));
        assert!(msg.contains("must be >= 1"));
        assert!(error.is_user_visible());
    }

    #[test]
    fn test_capacity_message() {
        let error = DhunterError::Capacity {
            chromosome: "7".to_string(),
            channel:    Channel::Hmc,
            row_bytes:  4_000,
            budget:     1_000,
        };
        let msg = format!("{error}");
        assert!(msg.contains("Chromosome 7 (hmC)"));
        assert!(msg.contains("4000 bytes"));
    }

    #[test]
    fn test_ingestion_is_absorbed() {
        let error = DhunterError::Ingestion {
            path:   PathBuf::from("missing.csv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!error.is_user_visible());
        assert!(format!("{error}").contains("missing.csv"));
    }
}
