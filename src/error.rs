//! # Error Types
//!
//! Custom error types for Pad Overlay using `thiserror`.
//!
//! Only setup paths (configuration, store, touchscreen discovery) return
//! these errors. Touch dispatch never fails: bad input is dropped and store
//! failures are logged and swallowed.

use thiserror::Error;

/// Main error type for Pad Overlay
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout store JSON errors
    #[error("Store format error: {0}")]
    Json(#[from] serde_json::Error),

    /// Layout store read/write errors
    #[error("Store error: {0}")]
    Store(String),

    /// Two controls were given the same identity
    #[error("Duplicate control identity: {0}")]
    DuplicateControl(String),

    /// Touchscreen device errors
    #[error("Touchscreen error: {0}")]
    Touchscreen(String),

    /// No multitouch device found
    #[error("No multitouch touchscreen found")]
    TouchscreenNotFound,
}

/// Result type alias for Pad Overlay
pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverlayError::DuplicateControl("dpad".to_string());
        assert_eq!(err.to_string(), "Duplicate control identity: dpad");

        let err = OverlayError::TouchscreenNotFound;
        assert_eq!(err.to_string(), "No multitouch touchscreen found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: OverlayError = io.into();
        assert!(matches!(err, OverlayError::Io(_)));
    }
}
