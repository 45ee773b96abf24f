//! # Tabular Export
//!
//! Serializes an ordered record sequence into comma-separated text with a
//! fixed six-column header. Fields are joined with `,` verbatim: there is
//! no quoting, so a free-text field containing a comma shifts the columns
//! of its row. Downstream consumers already parse this shape.

use chrono::NaiveDate;

use credreg_core::{export_stamp, format_numeric, CertificateRecord};

/// Column headers, in output order.
pub const EXPORT_HEADER: [&str; 6] = [
    "Certificate ID",
    "Student Name",
    "Degree",
    "Issue Date",
    "Status",
    "Valid",
];

/// Render `records` as header line plus one line per record. Lines are
/// separated by `\n` with no trailing newline. An empty input yields the
/// header alone.
pub fn serialize<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a CertificateRecord>,
{
    let mut lines = vec![EXPORT_HEADER.join(",")];
    lines.extend(records.into_iter().map(row));
    lines.join("\n")
}

fn row(record: &CertificateRecord) -> String {
    let issued = format_numeric(record.issue_date);
    [
        record.id.as_str(),
        record.student_name.as_str(),
        record.degree_title.as_str(),
        issued.as_str(),
        record.status().as_str(),
        if record.is_valid() { "Yes" } else { "No" },
    ]
    .join(",")
}

/// Suggested file name for an export produced on `today`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("certificates-search-results-{}.csv", export_stamp(today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::rec;
    use credreg_core::{CertificateRecord, CertificateStatus};

    #[test]
    fn empty_input_yields_header_only() {
        let out = serialize(&Vec::<CertificateRecord>::new());
        assert_eq!(out, "Certificate ID,Student Name,Degree,Issue Date,Status,Valid");
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn one_row_per_record_in_order() {
        let records = vec![
            rec("CERT-1", "Jane Doe", "Computer Science", (2025, 1, 5)),
            rec("CERT-2", "Sam Lee", "Physics", (2024, 11, 30))
                .with_status(CertificateStatus::Revoked),
        ];
        let out = serialize(&records);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split(',').count(), EXPORT_HEADER.len());
        assert_eq!(lines[1], "CERT-1,Jane Doe,Computer Science,1/5/2025,active,Yes");
        assert_eq!(lines[2], "CERT-2,Sam Lee,Physics,11/30/2024,revoked,No");
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn embedded_commas_are_not_escaped() {
        let records = vec![rec("C", "Doe, Jane", "Arts", (2025, 2, 1))];
        let out = serialize(&records);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row, "C,Doe, Jane,Arts,2/1/2025,active,Yes");
        // Known limitation: the row now has seven comma-separated cells.
        assert_eq!(row.split(',').count(), 7);
    }

    #[test]
    fn file_name_embeds_date() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            export_file_name(day),
            "certificates-search-results-2026-10-19.csv"
        );
    }
}
