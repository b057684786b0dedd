//! Error types for the overlay
//!
//! Error variants use `#[source]` to preserve error chains so the log file shows
//! the full cause of a failed request or save.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for the overlay
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request to the stats service failed
    #[error("Stats API request failed: {0}")]
    ApiError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stats service answered with a non-success status
    #[error("Stats API returned status {0}")]
    ApiStatus(u16),

    /// Background poller could not be started or stopped
    #[error("Poller error: {0}")]
    PollerError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Window lifecycle was driven out of order
    #[error("Invalid window transition from {from} to {to}")]
    InvalidTransition {
        /// Phase the window was in
        from: &'static str,
        /// Phase that was requested
        to: &'static str,
    },

    /// Graph index outside of the four team-size plots
    #[error("Graph index {0} is out of range")]
    GraphIndexOutOfRange(usize),

    /// Menu command id with no entry in the command table
    #[error("Unknown menu command: {0}")]
    UnknownCommand(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Convert an error to a user-friendly message for error dialogs
pub fn get_user_friendly_error(error: &OverlayError) -> String {
    match error {
        OverlayError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to:\n\
             %APPDATA%\\AoE4_Overlay"
            .to_string(),
        OverlayError::ApiError(_) | OverlayError::ApiStatus(_) => {
            "Unable to reach the stats service.\n\n\
             Please check your internet connection.\n\
             Match data will refresh once the service is reachable again."
                .to_string()
        }
        OverlayError::PollerError(_) => "Failed to run the background data refresh.\n\n\
             Try restarting the application."
            .to_string(),
        OverlayError::InvalidTransition { .. }
        | OverlayError::GraphIndexOutOfRange(_)
        | OverlayError::UnknownCommand(_) => {
            format!("An internal error occurred:\n\n{error}")
        }
        OverlayError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        OverlayError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = OverlayError::ApiStatus(503);
        assert_eq!(error.to_string(), "Stats API returned status 503");

        let error = OverlayError::InvalidTransition {
            from: "Terminated",
            to: "Finishing",
        };
        assert_eq!(
            error.to_string(),
            "Invalid window transition from Terminated to Finishing"
        );
    }

    #[test]
    fn test_source_chain_is_preserved() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = OverlayError::ConfigError(Box::new(io));
        let source = error.source().expect("source should be preserved");
        assert_eq!(source.to_string(), "denied");
    }

    #[test]
    fn test_user_friendly_messages() {
        let message = get_user_friendly_error(&OverlayError::ConfigError(StringError::new("x")));
        assert!(message.contains("AoE4_Overlay"));

        let message = get_user_friendly_error(&OverlayError::ApiStatus(500));
        assert!(message.contains("stats service"));

        let message = get_user_friendly_error(&OverlayError::GraphIndexOutOfRange(7));
        assert!(message.contains("Graph index 7"));
    }
}
