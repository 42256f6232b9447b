//! Configuration error types for analysis configuration validation.

use std::env;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Risk weights don't sum to 1.0
    #[error("Invalid weights: {0}")]
    InvalidWeights(&'static str),

    /// Threshold bands are not strictly ordered
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),

    /// Environment variable access error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] env::VarError),

    /// Failed to parse configuration value
    #[error("Parse error: {0}")]
    Parse(String),
}
