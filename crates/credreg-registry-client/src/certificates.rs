//! Typed client for the registry's certificate endpoints.

use reqwest::StatusCode;

use credreg_core::{CertificateId, CertificateRecord};

use crate::error::RegistryError;
use crate::http::{check_status, open_envelope, HttpCore};
use crate::retry::{self, Replay};
use crate::types::{CertificateListing, Envelope, VerificationResult};

/// Client for listing, revoking and verifying certificates.
#[derive(Debug, Clone)]
pub struct CertificateClient {
    core: HttpCore,
}

impl CertificateClient {
    pub(crate) fn new(core: HttpCore) -> Self {
        Self { core }
    }

    /// Fetch the full listing as delivered.
    ///
    /// Calls `GET {base_url}/certificates`. Requires an administrator token.
    pub async fn list(&self) -> Result<CertificateListing, RegistryError> {
        let endpoint = "GET /certificates";
        let url = self.core.url(&["certificates"])?;

        let resp = retry::send(endpoint, Replay::Always, || {
            self.core.authorized(self.core.http.get(url.clone())).send()
        })
            .await
            .map_err(|e| RegistryError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        let resp = check_status(endpoint, resp).await?;

        let env: Envelope<CertificateListing> =
            resp.json().await.map_err(|e| RegistryError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;
        open_envelope(endpoint, env)
    }

    /// Fetch the full listing mapped into console records, in delivery
    /// order.
    pub async fn fetch_records(&self) -> Result<Vec<CertificateRecord>, RegistryError> {
        let listing = self.list().await?;
        let delivered = listing.certificates.len();
        if let Some(total) = listing.total_count {
            if total != delivered {
                tracing::warn!(total, delivered, "registry total_count disagrees with listing");
            }
        }
        let records = listing
            .into_records()
            .map_err(|e| RegistryError::Malformed {
                endpoint: "GET /certificates".into(),
                reason: e.to_string(),
            })?;
        tracing::debug!(count = records.len(), "fetched certificate listing");
        Ok(records)
    }

    /// Revoke a certificate.
    ///
    /// Calls `DELETE {base_url}/delete_certificate/{id}`. The registry
    /// keeps the record and marks it revoked.
    ///
    /// Not idempotent: after a timeout the call is not repeated, since the
    /// registry may already have applied it. Reload to learn the outcome.
    pub async fn revoke(&self, id: &CertificateId) -> Result<(), RegistryError> {
        let endpoint = format!("DELETE /delete_certificate/{id}");
        let url = self.core.url(&["delete_certificate", id.as_str()])?;

        let resp = retry::send(&endpoint, Replay::ConnectFailureOnly, || {
            self.core.authorized(self.core.http.delete(url.clone())).send()
        })
            .await
            .map_err(|e| RegistryError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        check_status(&endpoint, resp).await?;

        tracing::info!(%id, "registry accepted revocation");
        Ok(())
    }

    /// Public verification lookup. An unknown identifier is not an error:
    /// it yields `valid: false` with the registry's message.
    ///
    /// Calls `GET {base_url}/verify/simple/{id}`.
    pub async fn verify(&self, id: &CertificateId) -> Result<VerificationResult, RegistryError> {
        let endpoint = format!("GET /verify/simple/{id}");
        let url = self.core.url(&["verify", "simple", id.as_str()])?;

        let resp = retry::send(&endpoint, Replay::Always, || self.core.http.get(url.clone()).send())
            .await
            .map_err(|e| RegistryError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let resp = if resp.status() == StatusCode::NOT_FOUND {
            resp
        } else {
            check_status(&endpoint, resp).await?
        };

        resp.json().await.map_err(|e| RegistryError::Deserialization {
            endpoint,
            source: e,
        })
    }
}
