/// Structured error types for sikuwat-core.
///
/// Library consumers (sikuwat-server) get composable errors; the
/// binary crate wraps them in `anyhow` with context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sikuwat-core operations
#[derive(Error, Debug)]
pub enum SikuwatError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// TOML document could not be parsed
    #[error("TOML error in {context}: {source}")]
    Toml {
        context: String,
        source: toml::de::Error,
    },

    /// Knowledge base content is unusable
    #[error("Invalid knowledge base: {reason}")]
    Knowledge { reason: String },

    /// Date string in neither YYYY-MM-DD nor RFC 3339 form
    #[error("Invalid date '{value}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate { value: String },

    /// File or directory not found
    #[error("Path not found: {path:?}")]
    PathNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for sikuwat-core operations
pub type Result<T> = std::result::Result<T, SikuwatError>;

impl SikuwatError {
    /// Create a TOML error with context
    pub fn toml(context: impl Into<String>, source: toml::de::Error) -> Self {
        Self::Toml {
            context: context.into(),
            source,
        }
    }

    /// Create a knowledge base error
    pub fn knowledge(reason: impl Into<String>) -> Self {
        Self::Knowledge {
            reason: reason.into(),
        }
    }

    /// Create an invalid date error
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SikuwatError::invalid_date("31/02/2024");
        assert_eq!(
            err.to_string(),
            "Invalid date '31/02/2024': expected YYYY-MM-DD or RFC 3339"
        );

        let err = SikuwatError::path_not_found("/tmp/knowledge.toml");
        assert!(err.to_string().contains("/tmp/knowledge.toml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SikuwatError = io_err.into();

        assert!(matches!(err, SikuwatError::Io { .. }));
    }
}
