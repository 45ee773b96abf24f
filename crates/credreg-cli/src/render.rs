//! Plain-text rendering of listings, notices and verification results.

use credreg_core::{format_display, CertificateRecord};
use credreg_engine::{Notice, NoticeKind, ViewSummary};
use credreg_registry_client::VerificationResult;

const HEADERS: [&str; 6] = ["ID", "Student", "Degree", "Issued", "Status", "Anchored"];

/// Render records as an aligned table, header first. Dates use the
/// `Mon D, YYYY` form.
pub fn table<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a CertificateRecord>,
{
    let rows: Vec<[String; 6]> = records
        .into_iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.student_name.clone(),
                r.degree_title.clone(),
                format_display(r.issue_date),
                r.status().to_string(),
                if r.has_block_hash() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&HEADERS)];
    out.extend(rows.iter().map(|row| {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&cells)
    }));
    out.join("\n")
}

/// `Showing X of Y certificates (...)`.
pub fn summary(summary: &ViewSummary) -> String {
    summary.to_string()
}

/// One-line notice, prefixed by its kind.
pub fn notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Success => format!("OK: {}", notice.message),
        NoticeKind::Error => format!("ERROR: {}", notice.message),
    }
}

/// Multi-line verification report.
pub fn verification(result: &VerificationResult) -> String {
    let mut out = Vec::new();
    if result.valid {
        out.push(format!("VALID: certificate {}", result.certificate_id));
    } else {
        out.push(format!(
            "INVALID: certificate {}: {}",
            result.certificate_id,
            result.message.as_deref().unwrap_or("not recognised by the registry")
        ));
    }
    let fields = [
        ("Student", &result.student_name),
        ("Degree", &result.degree),
        ("Issued", &result.issue_date),
        ("Checked at", &result.verification_timestamp),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            out.push(format!("  {label}: {value}"));
        }
    }
    if let Some(anchored) = result.blockchain_verified {
        out.push(format!("  Anchored: {}", if anchored { "yes" } else { "no" }));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_records;

    #[test]
    fn table_aligns_columns() {
        let records = sample_records();
        let out = table(&records);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID        Student"));
        assert!(lines[1].starts_with("CERT-001  Alice Johnson"));
        assert!(lines[1].contains("Jan 5, 2025"));
        assert!(lines[3].contains("revoked"));
        let degree_col = lines[0].find("Degree").unwrap();
        assert_eq!(&lines[2][degree_col..degree_col + 7], "Physics");
    }

    #[test]
    fn empty_table_is_header_only() {
        let out = table(&Vec::<CertificateRecord>::new());
        assert_eq!(out, "ID  Student  Degree  Issued  Status  Anchored");
    }

    #[test]
    fn invalid_verification_shows_message() {
        let result = VerificationResult {
            valid: false,
            certificate_id: "NOPE".into(),
            student_name: None,
            degree: None,
            issue_date: None,
            message: Some("Certificate not found".into()),
            verification_timestamp: None,
            blockchain_verified: None,
        };
        assert_eq!(
            verification(&result),
            "INVALID: certificate NOPE: Certificate not found"
        );
    }

    #[test]
    fn valid_verification_lists_details() {
        let result = VerificationResult {
            valid: true,
            certificate_id: "CERT-001".into(),
            student_name: Some("Alice Johnson".into()),
            degree: Some("Computer Science".into()),
            issue_date: Some("2025-01-05".into()),
            message: None,
            verification_timestamp: None,
            blockchain_verified: Some(true),
        };
        let out = verification(&result);
        assert!(out.starts_with("VALID: certificate CERT-001"));
        assert!(out.contains("  Student: Alice Johnson"));
        assert!(out.contains("  Anchored: yes"));
    }
}
