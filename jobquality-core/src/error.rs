//! Error types for the host-facing surfaces of the engine.
//!
//! Dirty job records are never errors: every defect in the input data is
//! reported as a quality finding. The variants here cover the few operations
//! that can genuinely fail, such as decoding a malformed JSON payload or
//! rejecting an invalid configuration.

use thiserror::Error;

/// Main error type for job quality operations.
#[derive(Debug, Error)]
pub enum JobQualityError {
    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with JobQualityError
pub type Result<T> = std::result::Result<T, JobQualityError>;

impl JobQualityError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}
