//! # Error Types: Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Store errors carry the certificate identifier they
//! concern so that callers can surface a precise message without
//! re-deriving context.

use thiserror::Error;

use crate::identity::CertificateId;

/// Errors raised by the in-memory record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The registry fetch failed or delivered a malformed response.
    /// The store is left empty.
    #[error("failed to load certificates: {reason}")]
    LoadFailure {
        /// Human-readable cause, suitable for a user-visible notice.
        reason: String,
    },

    /// No record with the given identifier is held by the store.
    #[error("certificate {id} not found")]
    NotFound {
        /// The identifier that was looked up.
        id: CertificateId,
    },

    /// The record is already revoked. Revocation is one-way and is never
    /// repeated.
    #[error("certificate {id} is already revoked")]
    AlreadyRevoked {
        /// The identifier of the revoked record.
        id: CertificateId,
    },
}

/// Error constructing a domain identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The identifier was empty or only whitespace.
    #[error("certificate identifier must not be empty")]
    Empty,
}

/// Error parsing an issue date delivered by the registry or typed by a user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised date {raw:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")]
pub struct DateError {
    /// The raw input that failed to parse.
    pub raw: String,
}

/// Failure reported by a registry collaborator (network error, non-2xx
/// response, malformed body, timeout). The message is user-presentable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl TransportError {
    /// Create a transport error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
