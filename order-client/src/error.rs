//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be sent or the response could not be received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with `success: false`
    #[error("Service error: {message}")]
    Service { message: String },

    /// Mutation referenced an item that is not in the cart
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response did not match the storefront contract
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fallback storage I/O failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Shorthand for a service-side rejection
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Whether the failure happened before any server answer arrived
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
