//! Error types for Stockwatch
//!
//! This module provides the error type hierarchy using `thiserror`
//! for proper error handling across all components.

use thiserror::Error;

/// The main error type for Stockwatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Webhook ingestion errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// SKU resolution errors
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Notification delivery errors
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Webhook ingestion and routing errors
#[derive(Error, Debug)]
pub enum WebhookError {
    /// No shop context could be established for the delivery
    #[error("Shop not found or uninstalled: {0}")]
    UnknownShop(String),

    /// Required delivery header is missing
    #[error("Missing webhook header: {0}")]
    MissingHeader(&'static str),

    /// Payload could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Topic processing failed unexpectedly
    #[error("Topic processing failed: {0}")]
    ProcessingFailed(String),
}

/// SKU resolution errors
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The platform request could not be sent or completed
    #[error("Platform request failed: {0}")]
    RequestFailed(String),

    /// The platform answered with a non-success status
    #[error("Platform returned HTTP {status}")]
    BadStatus {
        /// HTTP status code returned by the platform
        status: u16,
    },

    /// The platform response body was not the expected shape
    #[error("Malformed platform response: {0}")]
    MalformedResponse(String),
}

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The mail transport rejected or failed the send
    #[error("Email send failed: {0}")]
    SendFailed(String),

    /// The message could not be composed
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    /// Environment variable has an unusable value
    #[error("Invalid value for {var}: {reason}")]
    InvalidVar {
        /// The offending variable name
        var: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type alias for Stockwatch operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Webhook(WebhookError::UnknownShop("test.myshopify.com".to_string()));
        assert!(err.to_string().contains("Shop not found"));
        assert!(err.to_string().contains("test.myshopify.com"));
    }

    #[test]
    fn test_resolver_error() {
        let err = ResolverError::BadStatus { status: 404 };
        assert_eq!(err.to_string(), "Platform returned HTTP 404");
    }

    #[test]
    fn test_notify_error() {
        let err = NotifyError::SendFailed("connection reset".to_string());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_config_error() {
        let err = ConfigError::MissingVar("STOCKWATCH_PLATFORM_TOKEN");
        assert!(err.to_string().contains("STOCKWATCH_PLATFORM_TOKEN"));
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
