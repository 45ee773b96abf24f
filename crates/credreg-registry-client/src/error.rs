//! Registry client error types.

use credreg_core::TransportError;

/// Errors from registry calls.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The registry rejected the session token.
    #[error("registry rejected credentials for {endpoint}; log in again")]
    Unauthorized { endpoint: String },
    /// The registry returned a non-2xx status.
    #[error("registry {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response parsed but its content is unusable.
    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl From<RegistryError> for TransportError {
    fn from(err: RegistryError) -> Self {
        TransportError::new(err.to_string())
    }
}
