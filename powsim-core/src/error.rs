//! Error types for the simulation framework

use crate::Tick;
use thiserror::Error;

/// Top-level error type for simulation operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Record sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while validating a scenario, before the tick loop starts
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Field '{field}' must be {constraint}")]
    ConstraintViolation {
        field: &'static str,
        constraint: &'static str,
    },

    #[error("Invalid attack window [{start}, {end}]: {reason}")]
    AttackWindow {
        start: Tick,
        end: Tick,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn positive(field: &'static str) -> Self {
        ConfigError::ConstraintViolation {
            field,
            constraint: "greater than zero",
        }
    }

    pub(crate) fn finite_positive(field: &'static str, value: f64) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite value > 0, got {value}"),
        }
    }
}
