//! # credreg-registry-client: Typed Client for the Credential Registry
//!
//! Async access to the registry collaborator the console is built around:
//! - **Listing** via `GET /certificates` (administrator)
//! - **Revocation** via `DELETE /delete_certificate/{id}` (administrator)
//! - **Verification** via `GET /verify/simple/{id}` (public)
//! - **Health** via `GET /health` (public)
//!
//! All paths are relative to [`RegistryConfig::base_url`].
//!
//! [`RegistryClient`] implements [`RecordSource`] and [`RevokeTransport`],
//! so it plugs straight into the console engine. Transport failures are
//! retried with exponential backoff; HTTP error statuses are not.

pub mod certificates;
pub mod config;
pub mod error;
pub(crate) mod http;
pub(crate) mod retry;
pub mod session;
pub mod types;

pub use certificates::CertificateClient;
pub use config::{ConfigError, RegistryConfig};
pub use error::RegistryError;
pub use session::{SessionTokenProvider, StaticToken};
pub use types::{CertificateListing, HealthReport, VerificationResult, WireCertificate};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use credreg_core::{CertificateId, CertificateRecord, RecordSource, RevokeTransport, TransportError};

use crate::http::{check_status, open_envelope, HttpCore};
use crate::types::Envelope;

/// Top-level registry client.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    core: HttpCore,
    certificates: CertificateClient,
}

impl RegistryClient {
    /// Create a client that authenticates with the configured token.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        if let Some(token) = &config.api_token {
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidToken)?;
        }
        let session = Arc::new(StaticToken::new(config.api_token.clone()));
        Self::with_session(config, session)
    }

    /// Create a client that asks `session` for a token on every request.
    pub fn with_session(
        config: RegistryConfig,
        session: Arc<dyn SessionTokenProvider>,
    ) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistryError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let core = HttpCore::new(http, config.base_url, session);
        Ok(Self {
            certificates: CertificateClient::new(core.clone()),
            core,
        })
    }

    /// Access the certificate endpoints.
    pub fn certificates(&self) -> &CertificateClient {
        &self.certificates
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &url::Url {
        self.core.base_url()
    }

    /// Query registry health.
    ///
    /// Calls `GET {base_url}/health`.
    pub async fn health(&self) -> Result<HealthReport, RegistryError> {
        let endpoint = "GET /health";
        let url = self.core.url(&["health"])?;

        let resp = retry::send(endpoint, retry::Replay::Always, || self.core.http.get(url.clone()).send())
            .await
            .map_err(|e| RegistryError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        let resp = check_status(endpoint, resp).await?;

        let env: Envelope<HealthReport> =
            resp.json().await.map_err(|e| RegistryError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;
        open_envelope(endpoint, env)
    }
}

impl RecordSource for RegistryClient {
    fn fetch_all(
        &self,
    ) -> impl Future<Output = Result<Vec<CertificateRecord>, TransportError>> + Send {
        async move {
            self.certificates
                .fetch_records()
                .await
                .map_err(TransportError::from)
        }
    }
}

impl RevokeTransport for RegistryClient {
    fn revoke(
        &self,
        id: &CertificateId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        async move {
            self.certificates
                .revoke(id)
                .await
                .map_err(TransportError::from)
        }
    }
}
