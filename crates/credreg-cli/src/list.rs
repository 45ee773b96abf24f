//! # List Subcommand
//!
//! Loads the registry listing, applies the filter flags and prints the
//! resulting view as a table followed by a summary line, or as JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use credreg_engine::Console;

use crate::filters::FilterArgs;
use crate::{render, RegistryArgs};

/// Arguments for `credreg list`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print the view as a JSON array instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute `credreg list`.
pub async fn run_list(args: &ListArgs, registry: &RegistryArgs) -> Result<u8> {
    let client = registry.client()?;
    let console = crate::load_console(&client).await?;
    println!("{}", render_list(&console, args, crate::today())?);
    Ok(0)
}

/// Apply the filter flags to `console` and render its view.
pub fn render_list(console: &Console, args: &ListArgs, today: NaiveDate) -> Result<String> {
    console.set_filter_state(args.filters.to_state(today));
    let view = console.view();
    if args.json {
        return serde_json::to_string_pretty(view.records()).context("failed to encode listing");
    }
    Ok(format!(
        "{}\n\n{}",
        render::table(&view),
        render::summary(&console.summary())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_records;
    use credreg_engine::StatusFilter;

    fn console() -> Console {
        let console = Console::new();
        console.ingest(Ok(sample_records())).unwrap();
        console
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn table_output_ends_with_summary() {
        let args = ListArgs {
            filters: FilterArgs {
                status: Some(StatusFilter::Active),
                ..Default::default()
            },
            json: false,
        };
        let out = render_list(&console(), &args, today()).unwrap();
        assert!(out.contains("CERT-001"));
        assert!(!out.contains("CERT-003"));
        assert!(out.ends_with("Showing 2 of 3 certificates (2 active, 1 revoked)"));
    }

    #[test]
    fn json_output_uses_camel_case_records() {
        let args = ListArgs {
            filters: FilterArgs {
                search: Some("bob".into()),
                ..Default::default()
            },
            json: true,
        };
        let out = render_list(&console(), &args, today()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "CERT-002");
        assert_eq!(rows[0]["studentName"], "Bob Stone");
        assert_eq!(rows[0]["status"], "active");
        assert_eq!(rows[0]["issueDate"], "2024-06-15");
    }
}
