use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the requery library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Prompt template is malformed or cannot be rendered.
    #[error("Malformed prompt template: {message}")]
    Prompt {
        /// Error message
        message: String,
    },

    /// The transformation service call failed.
    #[error("Transformation service error: {message}")]
    Service {
        /// Error message
        message: String,
    },

    /// The transformation service returned no candidate output.
    #[error("Transformation service returned no candidate output")]
    EmptyResponse,

    /// The transformation service returned a payload without text content.
    #[error("Transformation service returned a non-text payload")]
    NonText,
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a malformed-prompt error.
    #[must_use]
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }

    /// Creates a service error.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this error came from the transformation service,
    /// including empty and non-text responses.
    #[must_use]
    pub const fn is_service(&self) -> bool {
        matches!(
            self,
            Self::Service { .. } | Self::EmptyResponse | Self::NonText
        )
    }
}
