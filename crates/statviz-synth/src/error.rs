//! Error types for dataset synthesis.

use thiserror::Error;

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors that can abort a synthesis run.
///
/// Every variant is fatal: generation stops before any partial dataset is
/// produced. Non-fatal conditions found during verification are reported as
/// [`VerificationWarning`](crate::analytics::VerificationWarning) instead.
#[derive(Error, Debug)]
pub enum SynthError {
    /// Invalid configuration (probabilities, scale bounds, counts).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Numerical failure, e.g. a correlation matrix that cannot be factorized.
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Configuration file could not be decoded.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a numerical error.
    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }

    /// Whether this error was caused by invalid configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Parse(_))
    }

    /// Whether this error was raised by a numerical routine.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::Numerical(_))
    }
}

impl From<toml::de::Error> for SynthError {
    fn from(e: toml::de::Error) -> Self {
        SynthError::Parse(e.to_string())
    }
}
