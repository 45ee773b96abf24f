//! # Export Subcommand
//!
//! Writes the filtered view to
//! `<output-dir>/certificates-search-results-YYYY-MM-DD.csv`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;

use credreg_engine::{export_file_name, Console};

use crate::filters::FilterArgs;
use crate::RegistryArgs;

/// Arguments for `credreg export`.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Directory the CSV file is written to. Created if missing.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

/// Execute `credreg export`.
pub async fn run_export(args: &ExportArgs, registry: &RegistryArgs) -> Result<u8> {
    let client = registry.client()?;
    let console = crate::load_console(&client).await?;
    let today = crate::today();
    console.set_filter_state(args.filters.to_state(today));

    let path = write_export(&console, &args.output_dir, today)?;
    let summary = console.summary();
    println!(
        "OK: exported {} of {} certificates to {}",
        summary.visible,
        summary.total,
        path.display()
    );
    Ok(0)
}

/// Write the console's current view as CSV into `dir`. Returns the path
/// written.
pub fn write_export(console: &Console, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
    if dir.exists() && !dir.is_dir() {
        bail!("output path is not a directory: {}", dir.display());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let path = dir.join(export_file_name(today));
    std::fs::write(&path, console.export_csv())
        .with_context(|| format!("failed to write export: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_records;
    use credreg_engine::StatusFilter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn writes_dated_file_with_filtered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let console = Console::new();
        console.ingest(Ok(sample_records())).unwrap();
        console.set_status_filter(StatusFilter::Revoked);

        let path = write_export(&console, dir.path(), today()).unwrap();
        assert_eq!(
            path,
            dir.path().join("certificates-search-results-2026-10-19.csv")
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Certificate ID,Student Name,Degree,Issue Date,Status,Valid\n\
             CERT-003,Carol King,History,9/1/2023,revoked,No"
        );
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("2026");
        let console = Console::new();
        console.ingest(Ok(sample_records())).unwrap();

        let path = write_export(&console, &nested, today()).unwrap();
        assert!(path.starts_with(&nested));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }

    #[test]
    fn empty_view_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let console = Console::new();
        console.ingest(Ok(sample_records())).unwrap();
        console.set_search_term("no such student");

        let path = write_export(&console, dir.path(), today()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn rejects_file_as_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();
        let console = Console::new();

        let err = write_export(&console, &file, today()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
