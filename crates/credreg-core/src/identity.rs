//! # Certificate Identifier Newtype
//!
//! Registry identifiers are opaque strings (e.g. `CERT-2025-001`). They are
//! wrapped so that a student name or degree title can never be passed where
//! an identifier is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Unique, immutable identifier of an issued certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    /// Wrap an identifier exactly as delivered.
    ///
    /// Surrounding whitespace is kept: the registry addresses certificates
    /// by the stored string, so an altered identifier would name a
    /// different resource. Use [`str::parse`] for typed input, which trims.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Empty`] if `raw` is empty or only
    /// whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(IdentifierError::Empty);
        }
        Ok(Self(raw))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CertificateId {
    type Err = IdentifierError;

    /// Parse operator input. Surrounding whitespace is dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl AsRef<str> for CertificateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
