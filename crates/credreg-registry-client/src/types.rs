//! Wire types for the registry API and their mapping into the console's
//! record model.
//!
//! The registry speaks snake_case JSON. Successful administrative calls
//! are wrapped in an [`Envelope`]; failures carry `error: true` with a
//! message and the HTTP status repeated in `status_code`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use credreg_core::{
    parse_issue_date, CertificateId, CertificateRecord, CertificateStatus, DateError,
    IdentifierError, VERIFIED_MARKER,
};

/// Standard response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// A certificate as delivered by the listing endpoint. Fields the console
/// does not consume (`created_by`, `revoked_at`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCertificate {
    pub certificate_id: String,
    pub student_name: String,
    pub degree: String,
    pub issue_date: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub qr_code_path: Option<String>,
}

/// Payload of `GET /certificates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateListing {
    pub certificates: Vec<WireCertificate>,
    #[serde(default)]
    pub total_count: Option<usize>,
}

/// Why a wire certificate could not become a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error("certificate {id}: {source}")]
    Date { id: String, source: DateError },
    #[error("certificate {id}: unknown status {status:?}")]
    UnknownStatus { id: String, status: String },
}

impl WireCertificate {
    /// Map into the console record model.
    ///
    /// A missing status means active. A non-blank `qr_code_path` marks the
    /// record as anchored.
    pub fn into_record(self) -> Result<CertificateRecord, MappingError> {
        let id = CertificateId::new(self.certificate_id.as_str())?;
        let issue_date = parse_issue_date(&self.issue_date).map_err(|source| MappingError::Date {
            id: self.certificate_id.clone(),
            source,
        })?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => CertificateStatus::Active,
            Some(s) if s.eq_ignore_ascii_case("active") => CertificateStatus::Active,
            Some(s) if s.eq_ignore_ascii_case("revoked") => CertificateStatus::Revoked,
            Some(other) => {
                return Err(MappingError::UnknownStatus {
                    id: self.certificate_id,
                    status: other.to_string(),
                })
            }
        };
        let anchored = self
            .qr_code_path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());

        let record = CertificateRecord::new(id, self.student_name, self.degree, issue_date)
            .with_status(status);
        Ok(if anchored {
            record.with_block_hash(VERIFIED_MARKER)
        } else {
            record
        })
    }
}

impl CertificateListing {
    /// Map every certificate, failing on the first unusable one.
    pub fn into_records(self) -> Result<Vec<CertificateRecord>, MappingError> {
        self.certificates
            .into_iter()
            .map(WireCertificate::into_record)
            .collect()
    }
}

/// Result of the public verification lookup.
///
/// Unknown identifiers come back with `valid: false` and a message; the
/// holder fields are then absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub certificate_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub verification_timestamp: Option<String>,
    #[serde(default)]
    pub blockchain_verified: Option<bool>,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

impl HealthReport {
    /// Whether the registry reports itself fully healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(record: &CertificateRecord) -> String {
        record.issue_date.to_string()
    }

    fn wire(id: &str, date: &str) -> WireCertificate {
        WireCertificate {
            certificate_id: id.into(),
            student_name: "Jane Doe".into(),
            degree: "Computer Science".into(),
            issue_date: date.into(),
            status: None,
            qr_code_path: None,
        }
    }

    #[test]
    fn missing_status_defaults_to_active() {
        let record = wire("CERT-1", "2025-01-05").into_record().unwrap();
        assert_eq!(record.status(), CertificateStatus::Active);
        assert_eq!(ymd(&record), "2025-01-05");
        assert_eq!(record.created_at, record.issue_date);
        assert!(!record.has_block_hash());
    }

    #[test]
    fn qr_code_path_marks_anchored() {
        let mut w = wire("CERT-1", "2025-01-05");
        w.qr_code_path = Some("static/qrcodes/CERT-1.png".into());
        let record = w.into_record().unwrap();
        assert_eq!(record.block_hash, VERIFIED_MARKER);

        let mut w = wire("CERT-2", "2025-01-05");
        w.qr_code_path = Some("  ".into());
        assert!(!w.into_record().unwrap().has_block_hash());
    }

    #[test]
    fn status_is_case_insensitive() {
        let mut w = wire("CERT-1", "2025-01-05");
        w.status = Some("Revoked".into());
        assert_eq!(w.into_record().unwrap().status(), CertificateStatus::Revoked);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut w = wire("CERT-1", "2025-01-05");
        w.status = Some("suspended".into());
        assert!(matches!(
            w.into_record(),
            Err(MappingError::UnknownStatus { .. })
        ));
    }

    #[test]
    fn timestamp_dates_use_date_part() {
        let record = wire("CERT-1", "2024-06-15T09:30:00").into_record().unwrap();
        assert_eq!(ymd(&record), "2024-06-15");
    }

    #[test]
    fn bad_date_names_the_certificate() {
        let err = wire("CERT-9", "15/06/2024").into_record().unwrap_err();
        assert!(err.to_string().starts_with("certificate CERT-9:"));
    }

    #[test]
    fn identifier_is_kept_as_delivered() {
        let record = wire(" CERT-1 ", "2025-01-05").into_record().unwrap();
        assert_eq!(record.id.as_str(), " CERT-1 ");
    }

    #[test]
    fn blank_identifier_is_rejected() {
        assert!(matches!(
            wire("  ", "2025-01-05").into_record(),
            Err(MappingError::Identifier(_))
        ));
    }

    #[test]
    fn listing_envelope_parses_with_extra_fields() {
        let body = serde_json::json!({
            "error": false,
            "message": "Certificates retrieved successfully",
            "data": {
                "certificates": [{
                    "id": 1,
                    "certificate_id": "CERT-1",
                    "student_name": "Jane Doe",
                    "degree": "Physics",
                    "issue_date": "2025-01-05",
                    "qr_code_path": null,
                    "created_by": "admin",
                    "status": "active",
                    "revoked_by": null,
                    "revoked_at": null,
                    "qr_code_url": "/static/qrcodes/CERT-1.png"
                }],
                "total_count": 1
            }
        });
        let env: Envelope<CertificateListing> = serde_json::from_value(body).unwrap();
        assert!(!env.error);
        let listing = env.data.unwrap();
        assert_eq!(listing.total_count, Some(1));
        let records = listing.into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].degree_title, "Physics");
    }

    #[test]
    fn error_envelope_parses_without_data() {
        let body = serde_json::json!({
            "error": true,
            "message": "Certificate not found",
            "status_code": 404
        });
        let env: Envelope<CertificateListing> = serde_json::from_value(body).unwrap();
        assert!(env.error);
        assert!(env.data.is_none());
        assert_eq!(env.status_code, Some(404));
    }

    #[test]
    fn not_found_verification_parses() {
        let body = serde_json::json!({
            "valid": false,
            "message": "Certificate not found",
            "certificate_id": "NOPE"
        });
        let result: VerificationResult = serde_json::from_value(body).unwrap();
        assert!(!result.valid);
        assert_eq!(result.student_name, None);
        assert_eq!(result.message.as_deref(), Some("Certificate not found"));
    }
}
