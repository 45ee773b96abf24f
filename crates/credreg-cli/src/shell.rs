//! # Shell Subcommand
//!
//! Line-oriented interactive session over one [`Console`]. Filters,
//! search history and the revocation workflow persist across commands,
//! so `revoke` opens a confirmation that a later `confirm` or `cancel`
//! resolves.
//!
//! ```text
//! credreg> search smith
//! credreg> quick this-year
//! credreg> revoke CERT-2025-001
//! credreg> confirm
//! ```

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use credreg_core::{CertificateId, IdentifierError, RecordSource, RevokeTransport};
use credreg_engine::{
    Console, DateRange, QuickFilter, RevocationState, SearchField, StatusFilter,
};

use crate::{render, RegistryArgs};

const PROMPT: &str = "credreg> ";

const HELP: &str = "\
Commands:
  search [TERM]          set the search term and remember it (no term clears it)
  field all|student|degree|id
  status all|active|revoked
  range FROM TO          issue-date bounds as YYYY-MM-DD, '-' for open; 'range clear'
  quick recent|this-year|active|revoked
  history                list recent searches
  recall N               re-run search N from 'history'
  clear                  reset all filters ('clear history' forgets searches)
  revoke ID              ask to revoke a certificate
  confirm [ID]           carry out the pending revocation
  cancel                 abandon the pending revocation
  export [DIR]           write the current view as CSV
  reload                 fetch the listing again
  show                   print the current view
  help                   this text
  quit                   leave the shell";

/// Arguments for `credreg shell`.
#[derive(Args, Debug, Clone)]
pub struct ShellArgs {
    /// Default directory for `export`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub export_dir: PathBuf,
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    Field(SearchField),
    Status(StatusFilter),
    Range(DateRange),
    Quick(QuickFilter),
    History,
    /// 1-based position as printed by `history`.
    Recall(usize),
    Clear,
    ClearHistory,
    Revoke(CertificateId),
    Confirm(Option<CertificateId>),
    Cancel,
    Export(Option<PathBuf>),
    Reload,
    Show,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" => ShellCommand::Search(rest.to_string()),
        "field" => ShellCommand::Field(rest.parse()?),
        "status" => ShellCommand::Status(rest.parse()?),
        "range" => ShellCommand::Range(parse_range(rest)?),
        "quick" => ShellCommand::Quick(rest.parse()?),
        "history" => no_args(verb, rest, ShellCommand::History)?,
        "recall" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => ShellCommand::Recall(n),
            _ => return Err(format!("usage: recall N (got {rest:?})")),
        },
        "clear" => match rest.to_ascii_lowercase().as_str() {
            "" => ShellCommand::Clear,
            "history" => ShellCommand::ClearHistory,
            other => return Err(format!("usage: clear [history] (got {other:?})")),
        },
        "revoke" => ShellCommand::Revoke(rest.parse().map_err(|e: IdentifierError| e.to_string())?),
        "confirm" => ShellCommand::Confirm(if rest.is_empty() {
            None
        } else {
            Some(rest.parse().map_err(|e: IdentifierError| e.to_string())?)
        }),
        "cancel" => no_args(verb, rest, ShellCommand::Cancel)?,
        "export" => ShellCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "reload" => no_args(verb, rest, ShellCommand::Reload)?,
        "show" | "ls" => no_args(verb, rest, ShellCommand::Show)?,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}; type 'help'")),
    };
    Ok(Some(command))
}

fn no_args(verb: &str, rest: &str, command: ShellCommand) -> Result<ShellCommand, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(format!("{verb} takes no arguments"))
    }
}

fn parse_range(rest: &str) -> Result<DateRange, String> {
    let bound = |s: &str| -> Result<Option<NaiveDate>, String> {
        if s == "-" {
            return Ok(None);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("invalid date {s:?}: {e}"))
    };
    let parts: Vec<&str> = rest.split_whitespace().collect();
    match parts.as_slice() {
        [clear] if clear.eq_ignore_ascii_case("clear") => Ok(DateRange::default()),
        [from, to] => Ok(DateRange {
            start: bound(from)?,
            end: bound(to)?,
        }),
        _ => Err("usage: range FROM TO | range clear".to_string()),
    }
}

/// Execute `credreg shell` on standard input and output.
pub async fn run_shell_command(args: &ShellArgs, registry: &RegistryArgs) -> Result<u8> {
    let client = registry.client()?;
    let console = Console::new();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_shell(
        &console,
        &client,
        &args.export_dir,
        crate::today(),
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
    .await
}

/// Run a session until `quit` or end of input.
pub async fn run_shell<B, R, W>(
    console: &Console,
    backend: &B,
    export_dir: &Path,
    today: NaiveDate,
    input: &mut R,
    out: &mut W,
) -> Result<u8>
where
    B: RecordSource + RevokeTransport,
    R: BufRead,
    W: Write,
{
    let subscription = console.subscribe(|event| tracing::debug!(?event, "console event"));

    reload(console, backend, out).await?;
    writeln!(out, "Type 'help' for commands.")?;

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "ERROR: {message}")?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        execute(console, backend, export_dir, today, command, out).await?;
    }

    console.unsubscribe(subscription);
    Ok(0)
}

async fn execute<B, W>(
    console: &Console,
    backend: &B,
    export_dir: &Path,
    today: NaiveDate,
    command: ShellCommand,
    out: &mut W,
) -> Result<()>
where
    B: RecordSource + RevokeTransport,
    W: Write,
{
    match command {
        ShellCommand::Search(term) => {
            console.submit_search(&term);
            print_summary(console, out)?;
        }
        ShellCommand::Field(field) => {
            console.set_search_field(field);
            print_summary(console, out)?;
        }
        ShellCommand::Status(status) => {
            console.set_status_filter(status);
            print_summary(console, out)?;
        }
        ShellCommand::Range(range) => {
            if range.start.is_some() != range.end.is_some() {
                writeln!(out, "note: a one-sided range does not narrow the view")?;
            }
            console.set_date_range(range);
            print_summary(console, out)?;
        }
        ShellCommand::Quick(quick) => {
            console.apply_quick_filter(quick, today);
            writeln!(out, "Applied quick filter: {}", quick.label())?;
            print_summary(console, out)?;
        }
        ShellCommand::History => {
            let history = console.history();
            if history.is_empty() {
                writeln!(out, "(no recent searches)")?;
            }
            for (i, term) in history.iter().enumerate() {
                writeln!(out, "  {}. {term}", i + 1)?;
            }
        }
        ShellCommand::Recall(n) => match console.recall_search(n - 1) {
            Some(term) => {
                writeln!(out, "Searching for {term:?}")?;
                print_summary(console, out)?;
            }
            None => writeln!(out, "ERROR: no search #{n} in history")?,
        },
        ShellCommand::Clear => {
            console.clear_filters();
            print_summary(console, out)?;
        }
        ShellCommand::ClearHistory => {
            console.clear_history();
            writeln!(out, "Search history cleared.")?;
        }
        ShellCommand::Revoke(id) => match console.request_revoke(id.clone()) {
            Ok(()) => {
                let who = console
                    .record(&id)
                    .map(|r| format!(" ({}, {})", r.student_name, r.degree_title))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "Revoke certificate {id}{who}? This cannot be undone. \
                     Type 'confirm' to proceed or 'cancel' to abort."
                )?;
            }
            Err(e) => writeln!(out, "ERROR: {e}")?,
        },
        ShellCommand::Confirm(explicit) => {
            let id = match (explicit, console.revocation_state()) {
                (Some(id), _) => id,
                (None, RevocationState::ConfirmPending(id)) => id,
                (None, state) => {
                    writeln!(out, "ERROR: nothing to confirm (workflow is {state})")?;
                    return Ok(());
                }
            };
            console.dismiss_notice();
            let outcome = console.confirm_revoke(&id, backend).await;
            match (console.notice(), outcome) {
                (Some(notice), _) => writeln!(out, "{}", render::notice(&notice))?,
                (None, Err(e)) => writeln!(out, "ERROR: {e}")?,
                (None, Ok(_)) => {}
            }
        }
        ShellCommand::Cancel => match console.cancel_revoke() {
            Ok(id) => writeln!(out, "Cancelled revocation of {id}.")?,
            Err(e) => writeln!(out, "ERROR: {e}")?,
        },
        ShellCommand::Export(dir) => {
            let dir = dir.as_deref().unwrap_or(export_dir);
            match crate::export::write_export(console, dir, today) {
                Ok(path) => writeln!(
                    out,
                    "OK: exported {} certificates to {}",
                    console.summary().visible,
                    path.display()
                )?,
                Err(e) => writeln!(out, "ERROR: {e:#}")?,
            }
        }
        ShellCommand::Reload => reload(console, backend, out).await?,
        ShellCommand::Show => {
            writeln!(out, "{}", render::table(&console.view()))?;
            print_summary(console, out)?;
        }
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => {}
    }
    Ok(())
}

async fn reload<S: RecordSource, W: Write>(console: &Console, source: &S, out: &mut W) -> Result<()> {
    console.dismiss_notice();
    match console.load(source).await {
        Ok(count) => writeln!(out, "Loaded {count} certificates.")?,
        Err(e) => {
            let message = console
                .notice()
                .map(|n| render::notice(&n))
                .unwrap_or_else(|| format!("ERROR: {e}"));
            writeln!(out, "{message}")?;
            tracing::debug!(error = %e, "listing load failed");
        }
    }
    Ok(())
}

fn print_summary<W: Write>(console: &Console, out: &mut W) -> Result<()> {
    writeln!(out, "{}", render::summary(&console.summary()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_records, FakeRegistry};
    use credreg_core::CertificateStatus;
    use std::sync::atomic::Ordering;

    fn id(s: &str) -> CertificateId {
        CertificateId::new(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn session(registry: &FakeRegistry, script: &str) -> (Console, String) {
        let console = Console::new();
        let dir = std::env::temp_dir();
        let mut out = Vec::new();
        run_shell(
            &console,
            registry,
            &dir,
            ymd(2024, 7, 1),
            &mut script.as_bytes(),
            &mut out,
        )
        .await
        .unwrap();
        (console, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_filter_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("search  Jane Doe "),
            Ok(Some(ShellCommand::Search("Jane Doe".into())))
        );
        assert_eq!(parse_command("search"), Ok(Some(ShellCommand::Search(String::new()))));
        assert_eq!(
            parse_command("FIELD degree"),
            Ok(Some(ShellCommand::Field(SearchField::Degree)))
        );
        assert_eq!(
            parse_command("status revoked"),
            Ok(Some(ShellCommand::Status(StatusFilter::Revoked)))
        );
        assert_eq!(
            parse_command("quick this-year"),
            Ok(Some(ShellCommand::Quick(QuickFilter::ThisYear)))
        );
        assert_eq!(
            parse_command("range 2024-01-01 -"),
            Ok(Some(ShellCommand::Range(DateRange {
                start: Some(ymd(2024, 1, 1)),
                end: None
            })))
        );
        assert_eq!(
            parse_command("range clear"),
            Ok(Some(ShellCommand::Range(DateRange::default())))
        );
    }

    #[test]
    fn parses_workflow_commands() {
        assert_eq!(
            parse_command("revoke CERT-1"),
            Ok(Some(ShellCommand::Revoke(id("CERT-1"))))
        );
        assert_eq!(parse_command("confirm"), Ok(Some(ShellCommand::Confirm(None))));
        assert_eq!(
            parse_command("confirm CERT-1"),
            Ok(Some(ShellCommand::Confirm(Some(id("CERT-1")))))
        );
        assert_eq!(parse_command("recall 2"), Ok(Some(ShellCommand::Recall(2))));
        assert_eq!(parse_command("clear history"), Ok(Some(ShellCommand::ClearHistory)));
        assert_eq!(parse_command("exit"), Ok(Some(ShellCommand::Quit)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("revoke").is_err());
        assert!(parse_command("recall 0").is_err());
        assert!(parse_command("status pending").is_err());
        assert!(parse_command("range 2024-13-01 2024-12-31").is_err());
        assert!(parse_command("range 2024-01-01").is_err());
        assert!(parse_command("show everything").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[tokio::test]
    async fn search_history_and_recall() {
        let registry = FakeRegistry::new(sample_records());
        let (console, out) = session(
            &registry,
            "search alice\nsearch bob\nsearch alice\nhistory\nrecall 2\nquit\n",
        )
        .await;
        assert!(out.contains("Loaded 3 certificates."));
        assert!(out.contains("  1. alice\n  2. bob\n"));
        assert!(out.contains("Searching for \"bob\""));
        assert_eq!(console.history(), vec!["bob", "alice"]);
        assert_eq!(console.filter_state().search_term, "bob");
        assert_eq!(console.summary().visible, 1);
    }

    #[tokio::test]
    async fn revoke_confirm_cycle() {
        let registry = FakeRegistry::new(sample_records());
        let (console, out) = session(
            &registry,
            "revoke CERT-001\nrevoke CERT-002\nconfirm\nstatus revoked\nshow\n",
        )
        .await;
        assert!(out.contains("Revoke certificate CERT-001 (Alice Johnson, Computer Science)?"));
        assert!(out.contains("ERROR: revocation of CERT-001 is already CONFIRM_PENDING"));
        assert!(out.contains("OK: Certificate revoked successfully"));
        assert!(out.contains("Showing 2 of 3 certificates (1 active, 2 revoked)"));
        assert_eq!(registry.revoke_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            console.record(&id("CERT-001")).unwrap().status(),
            CertificateStatus::Revoked
        );
    }

    #[tokio::test]
    async fn cancel_and_confirm_without_pending() {
        let registry = FakeRegistry::new(sample_records());
        let (console, out) = session(&registry, "revoke CERT-002\ncancel\nconfirm\n").await;
        assert!(out.contains("Cancelled revocation of CERT-002."));
        assert!(out.contains("ERROR: nothing to confirm (workflow is IDLE)"));
        assert_eq!(registry.revoke_calls.load(Ordering::SeqCst), 0);
        assert!(console.record(&id("CERT-002")).unwrap().is_valid());
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_retryable() {
        let registry = FakeRegistry::new(sample_records());
        registry.fail_fetch.store(true, Ordering::SeqCst);
        let console = Console::new();
        let mut out = Vec::new();
        let dir = std::env::temp_dir();

        run_shell(
            &console,
            &registry,
            &dir,
            ymd(2024, 7, 1),
            &mut "show\n".as_bytes(),
            &mut out,
        )
        .await
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ERROR: Failed to load certificates. Please try again."));
        assert!(text.contains("Showing 0 of 0 certificates"));

        registry.fail_fetch.store(false, Ordering::SeqCst);
        let mut out = Vec::new();
        execute(&console, &registry, &dir, ymd(2024, 7, 1), ShellCommand::Reload, &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Loaded 3 certificates.\n");
    }

    #[tokio::test]
    async fn quick_filter_uses_injected_today() {
        let registry = FakeRegistry::new(sample_records());
        let (console, out) = session(&registry, "quick this-year\n").await;
        assert!(out.contains("Applied quick filter: This Year"));
        // Only CERT-002 was issued in 2024.
        assert_eq!(console.summary().visible, 1);
    }

    #[tokio::test]
    async fn export_writes_into_requested_directory() {
        let registry = FakeRegistry::new(sample_records());
        let dir = tempfile::tempdir().unwrap();
        let script = format!("status active\nexport {}\n", dir.path().display());
        let (_console, out) = session(&registry, &script).await;
        assert!(out.contains("OK: exported 2 certificates to"));
        let path = dir.path().join("certificates-search-results-2024-07-01.csv");
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 3);
    }
}
