//! Shared HTTP plumbing: endpoint URLs, session tokens, status handling.

use std::sync::Arc;

use reqwest::StatusCode;
use url::Url;

use crate::config::ConfigError;
use crate::error::RegistryError;
use crate::session::SessionTokenProvider;
use crate::types::Envelope;

#[derive(Clone)]
pub(crate) struct HttpCore {
    pub(crate) http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionTokenProvider>,
}

impl std::fmt::Debug for HttpCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpCore {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: Url,
        session: Arc<dyn SessionTokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Segments are percent-encoded.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ConfigError::InvalidUrl(
                    self.base_url.to_string(),
                    "cannot be used as a base URL".to_string(),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the current session token, if any.
    pub(crate) fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        }
    }
}

/// Turn 401 into [`RegistryError::Unauthorized`] and any other non-2xx
/// status into [`RegistryError::ApiError`]. The error body's `message` is
/// preferred over the raw text when the registry sent its error envelope.
pub(crate) async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RegistryError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(RegistryError::Unauthorized {
            endpoint: endpoint.into(),
        });
    }
    if !status.is_success() {
        let raw = resp.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Envelope<serde_json::Value>>(&raw)
            .ok()
            .map(|env| env.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(raw);
        return Err(RegistryError::ApiError {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Unwrap a success envelope, rejecting `error: true` and missing data.
pub(crate) fn open_envelope<T>(endpoint: &str, env: Envelope<T>) -> Result<T, RegistryError> {
    if env.error {
        return Err(RegistryError::ApiError {
            endpoint: endpoint.into(),
            status: env.status_code.unwrap_or(200),
            body: env.message,
        });
    }
    env.data.ok_or_else(|| RegistryError::Malformed {
        endpoint: endpoint.into(),
        reason: "response envelope has no data".into(),
    })
}
