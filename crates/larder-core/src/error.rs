//! Error types for the larder sync engine.

use thiserror::Error;

/// Result type alias using larder's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for larder operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Device-local store operation failed (wraps sled::Error)
    #[error("Local store error: {0}")]
    LocalStore(#[from] sled::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Household lifecycle operation failed
    #[error("Household error: {0}")]
    Household(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("household h1".to_string());
        assert_eq!(err.to_string(), "Not found: household h1");
    }

    #[test]
    fn test_error_display_household() {
        let err = Error::Household("failed to create household".to_string());
        assert_eq!(err.to_string(), "Household error: failed to create household");
    }

    #[test]
    fn test_error_display_serialization() {
        let err = Error::Serialization("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("bad DATABASE_URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad DATABASE_URL");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
