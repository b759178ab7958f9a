//! Error types for the Sensi services.

use thiserror::Error;

/// Result type alias using the Sensi error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Sensi services.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External service error (completion provider, remote lookups)
    #[error("External service error: {0}")]
    External(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::External(_) => 502,
            Self::Timeout => 504,
            Self::WithContext { source, .. } => source.status_code(),
            _ => 500,
        }
    }

    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::External(_) => "EXTERNAL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::WithContext { source, .. } => source.code(),
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::NotFound("test".into()).status_code(), 404);
        assert_eq!(Error::InvalidInput("test".into()).status_code(), 400);
        assert_eq!(Error::External("test".into()).status_code(), 502);
        assert_eq!(Error::Timeout.status_code(), 504);
        assert_eq!(Error::Internal("test".into()).status_code(), 500);
        assert_eq!(Error::Config("test".into()).status_code(), 500);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::NotFound("preset abc".into());
        let with_ctx = err.with_context("deleting preset");
        assert!(matches!(with_ctx, Error::WithContext { .. }));
        assert_eq!(with_ctx.status_code(), 404);
        assert_eq!(with_ctx.code(), "NOT_FOUND");
        assert_eq!(with_ctx.to_string(), "deleting preset: Not found: preset abc");
    }

    #[test]
    fn test_result_ext_wraps_io_errors() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.context("writing presets").unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(err.status_code(), 500);
    }
}
