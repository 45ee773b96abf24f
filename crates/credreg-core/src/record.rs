//! # Certificate Records
//!
//! A `CertificateRecord` is one issued credential as held by the console.
//! Records are created once, when the registry listing is ingested, and
//! afterwards only their status changes.
//!
//! ## Lifecycle
//!
//! ```text
//! ACTIVE ──revoke()──▶ REVOKED
//! ```
//!
//! There is no transition out of `REVOKED`. A second `revoke()` is rejected
//! with [`StoreError::AlreadyRevoked`] and leaves the record untouched.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::identity::CertificateId;

/// Marker stored in `block_hash` when the registry reports an anchored
/// artifact for the certificate.
pub const VERIFIED_MARKER: &str = "verified";

/// Lifecycle status of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    /// Certificate is valid.
    #[default]
    Active,
    /// Certificate has been revoked. Terminal.
    Revoked,
}

impl CertificateStatus {
    /// The lowercase name used on the wire and in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }

    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issued credential tracked by the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Unique, immutable identifier.
    pub id: CertificateId,
    /// Name of the credential holder.
    pub student_name: String,
    /// Title of the awarded degree.
    pub degree_title: String,
    /// Calendar date of issue.
    pub issue_date: NaiveDate,
    status: CertificateStatus,
    /// When the record was created in the registry.
    pub created_at: NaiveDate,
    /// [`VERIFIED_MARKER`] when the registry holds an anchored artifact,
    /// otherwise empty.
    pub block_hash: String,
}

impl CertificateRecord {
    /// Create an active record with no block-hash marker. `created_at`
    /// defaults to the issue date.
    pub fn new(
        id: CertificateId,
        student_name: impl Into<String>,
        degree_title: impl Into<String>,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            student_name: student_name.into(),
            degree_title: degree_title.into(),
            issue_date,
            status: CertificateStatus::Active,
            created_at: issue_date,
            block_hash: String::new(),
        }
    }

    /// Set the status as delivered by the registry.
    pub fn with_status(mut self, status: CertificateStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the block-hash marker.
    pub fn with_block_hash(mut self, block_hash: impl Into<String>) -> Self {
        self.block_hash = block_hash.into();
        self
    }

    /// Current lifecycle status.
    pub fn status(&self) -> CertificateStatus {
        self.status
    }

    /// `true` while the certificate is active.
    pub fn is_valid(&self) -> bool {
        self.status == CertificateStatus::Active
    }

    /// `true` when the registry reported an anchored artifact.
    pub fn has_block_hash(&self) -> bool {
        !self.block_hash.is_empty()
    }

    /// Move the record from `Active` to `Revoked`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyRevoked`] if the record is already
    /// revoked. The record is not modified in that case.
    pub fn revoke(&mut self) -> Result<(), StoreError> {
        if self.status.is_terminal() {
            return Err(StoreError::AlreadyRevoked {
                id: self.id.clone(),
            });
        }
        self.status = CertificateStatus::Revoked;
        Ok(())
    }
}
