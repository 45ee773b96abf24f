//! Session token supply for authenticated registry calls.
//!
//! The client asks its provider for a token on every request, so a
//! provider backed by a login flow can rotate tokens without rebuilding
//! the client.

use zeroize::Zeroizing;

/// Source of the bearer token attached to registry requests.
pub trait SessionTokenProvider: Send + Sync {
    /// The current token, or `None` to send the request unauthenticated.
    fn bearer_token(&self) -> Option<Zeroizing<String>>;
}

/// A fixed token, typically taken from [`crate::RegistryConfig`].
#[derive(Clone, Default)]
pub struct StaticToken(Option<Zeroizing<String>>);

impl StaticToken {
    /// Wrap an optional token.
    pub fn new(token: Option<Zeroizing<String>>) -> Self {
        Self(token)
    }

    /// No token; only public endpoints will succeed.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&self.0.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SessionTokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<Zeroizing<String>> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_hands_out_copies() {
        let provider = StaticToken::new(Some(Zeroizing::new("abc".to_string())));
        assert_eq!(provider.bearer_token().as_deref().map(String::as_str), Some("abc"));
        assert_eq!(provider.bearer_token().as_deref().map(String::as_str), Some("abc"));
        assert!(StaticToken::anonymous().bearer_token().is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let provider = StaticToken::new(Some(Zeroizing::new("abc".to_string())));
        assert_eq!(format!("{provider:?}"), "StaticToken(Some(\"[REDACTED]\"))");
    }
}
