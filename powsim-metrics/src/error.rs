//! Error types for records, sinks and export

use powsim_core::SimError;
use thiserror::Error;

/// Errors related to recording and exporting a run
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<MetricsError> for SimError {
    fn from(err: MetricsError) -> Self {
        SimError::Sink(Box::new(err))
    }
}
