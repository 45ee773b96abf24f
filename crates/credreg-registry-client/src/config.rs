//! Registry client configuration.
//!
//! The base URL defaults to a registry running on the local machine.
//! Override via environment variables or explicit construction.

use url::Url;
use zeroize::Zeroizing;

/// Default registry base URL.
pub const DEFAULT_REGISTRY_URL: &str = "http://127.0.0.1:5000/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for connecting to the registry.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct RegistryConfig {
    /// Base URL all endpoint paths are appended to.
    pub base_url: Url,
    /// Bearer token for the administrative endpoints. The public
    /// verification and health endpoints work without one.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CREDREG_REGISTRY_URL` (default: `http://127.0.0.1:5000/api`)
    /// - `CREDREG_API_TOKEN` (optional)
    /// - `CREDREG_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("CREDREG_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            base_url: env_url("CREDREG_REGISTRY_URL", DEFAULT_REGISTRY_URL)?,
            api_token,
            timeout_secs: env_timeout("CREDREG_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Create a configuration pointing at a local mock server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16, token: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_token: Some(Zeroizing::new(token.to_string())),
            timeout_secs: 5,
        })
    }

    /// Replace the base URL with `raw`.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_url("--registry-url", raw)?;
        Ok(self)
    }

    /// Replace the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    /// Replace the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn parse_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            source.to_string(),
            format!("{raw} cannot be used as a base URL"),
        ));
    }
    Ok(url)
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn env_timeout(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidTimeout(var.to_string(), raw)),
            Ok(secs) => Ok(secs),
        },
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout for {0}: {1:?} (expected a positive number of seconds)")]
    InvalidTimeout(String, String),
    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = RegistryConfig::local_mock(9000, "test-token").unwrap();
        assert_eq!(cfg.api_token.as_deref().map(String::as_str), Some("test-token"));
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = RegistryConfig::local_mock(9000, "super-secret").unwrap();
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("super-secret"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("CREDREG_NONEXISTENT_VAR_12345", DEFAULT_REGISTRY_URL).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("CREDREG_TEST_BAD_URL", "not a url");
        let result = env_url("CREDREG_TEST_BAD_URL", DEFAULT_REGISTRY_URL);
        std::env::remove_var("CREDREG_TEST_BAD_URL");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(var, _)) if var == "CREDREG_TEST_BAD_URL"));
    }

    #[test]
    fn non_base_url_is_rejected() {
        assert!(parse_url("test", "mailto:admin@example.com").is_err());
    }

    #[test]
    fn timeout_must_be_positive() {
        std::env::set_var("CREDREG_TEST_TIMEOUT_ZERO", "0");
        std::env::set_var("CREDREG_TEST_TIMEOUT_OK", " 30 ");
        assert!(env_timeout("CREDREG_TEST_TIMEOUT_ZERO", 10).is_err());
        assert_eq!(env_timeout("CREDREG_TEST_TIMEOUT_OK", 10).unwrap(), 30);
        assert_eq!(env_timeout("CREDREG_TEST_TIMEOUT_ABSENT", 10).unwrap(), 10);
        std::env::remove_var("CREDREG_TEST_TIMEOUT_ZERO");
        std::env::remove_var("CREDREG_TEST_TIMEOUT_OK");
    }

    #[test]
    fn overrides_replace_fields() {
        let cfg = RegistryConfig::local_mock(9000, "a")
            .unwrap()
            .with_base_url("https://registry.example.edu/api")
            .unwrap()
            .with_token("b")
            .with_timeout_secs(3);
        assert_eq!(cfg.base_url.as_str(), "https://registry.example.edu/api");
        assert_eq!(cfg.api_token.as_deref().map(String::as_str), Some("b"));
        assert_eq!(cfg.timeout_secs, 3);
    }
}
