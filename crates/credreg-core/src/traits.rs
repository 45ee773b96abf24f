//! # Registry Collaborator Traits
//!
//! The console never talks HTTP itself. It consumes the external registry
//! through two narrow seams: fetching the full listing, and revoking one
//! certificate. Transport concerns (timeouts, retries, authentication)
//! belong to the implementor and surface here only as a [`TransportError`].

use std::future::Future;

use crate::error::TransportError;
use crate::identity::CertificateId;
use crate::record::CertificateRecord;

/// Source of the full certificate listing, in registry delivery order.
pub trait RecordSource {
    /// Fetch every certificate the registry holds.
    fn fetch_all(
        &self,
    ) -> impl Future<Output = Result<Vec<CertificateRecord>, TransportError>> + Send;
}

/// Remote revocation call. Only success or failure is consumed.
pub trait RevokeTransport {
    /// Ask the registry to revoke `id`.
    fn revoke(&self, id: &CertificateId) -> impl Future<Output = Result<(), TransportError>> + Send;
}
