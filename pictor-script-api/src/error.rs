//! Error types for script authors

use thiserror::Error;

/// Errors a script's `run` can return.
///
/// These propagate unmodified through the dispatcher to the invocation
/// caller; the host never swallows them.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script received arguments it cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The processing pipeline rejected the script's request
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl ScriptError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a processing error
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScriptError::InvalidArgument("expected integer".to_string());
        assert_eq!(err.to_string(), "Invalid argument: expected integer");

        let err = ScriptError::Processing("out of memory".to_string());
        assert_eq!(err.to_string(), "Processing failed: out of memory");

        let err = ScriptError::Custom("something happened".to_string());
        assert_eq!(err.to_string(), "something happened");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ScriptError = io_err.into();
        assert!(matches!(err, ScriptError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            ScriptError::custom("x"),
            ScriptError::Custom(_)
        ));
        assert!(matches!(
            ScriptError::invalid_argument("x"),
            ScriptError::InvalidArgument(_)
        ));
        assert!(matches!(
            ScriptError::processing("x"),
            ScriptError::Processing(_)
        ));
    }
}
