//! # Revoke Subcommand
//!
//! Loads the listing, opens a revocation confirmation for one certificate,
//! asks the operator to confirm (unless `--yes`), then carries it out.
//! Revocation is irreversible.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;

use credreg_core::{CertificateId, RevokeTransport};
use credreg_engine::{Console, NoticeKind};

use crate::{render, RegistryArgs};

/// Arguments for `credreg revoke`.
#[derive(Args, Debug, Clone)]
pub struct RevokeArgs {
    /// Identifier of the certificate to revoke.
    #[arg(value_name = "ID")]
    pub id: CertificateId,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Execute `credreg revoke`.
pub async fn run_revoke(args: &RevokeArgs, registry: &RegistryArgs) -> Result<u8> {
    let client = registry.client()?;
    let console = crate::load_console(&client).await?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    revoke_with_prompt(
        &console,
        &client,
        &args.id,
        args.yes,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
    .await
}

/// Drive one revocation through the console. Returns the exit code:
/// 0 when revoked, 1 when declined or failed.
pub async fn revoke_with_prompt<T, R, W>(
    console: &Console,
    transport: &T,
    id: &CertificateId,
    assume_yes: bool,
    input: &mut R,
    out: &mut W,
) -> Result<u8>
where
    T: RevokeTransport,
    R: BufRead,
    W: Write,
{
    console.request_revoke(id.clone())?;

    if !assume_yes {
        let prompt = match console.record(id) {
            Some(record) => format!(
                "Revoke certificate {} ({}, {})? This cannot be undone. [y/N] ",
                record.id, record.student_name, record.degree_title
            ),
            None => format!("Revoke certificate {id}? This cannot be undone. [y/N] "),
        };
        if !ask(&prompt, input, out)? {
            console.cancel_revoke()?;
            writeln!(out, "Cancelled.")?;
            return Ok(1);
        }
    }

    console.dismiss_notice();
    let outcome = console.confirm_revoke(id, transport).await;
    if let Some(notice) = console.notice() {
        writeln!(out, "{}", render::notice(&notice))?;
        if notice.kind == NoticeKind::Error {
            if let Err(e) = &outcome {
                tracing::debug!(error = %e, "revocation failed");
            }
            return Ok(1);
        }
    }
    outcome?;
    Ok(0)
}

/// Ask a yes/no question. Only `y` or `yes` (any case) confirms; end of
/// input declines.
pub fn ask<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{prompt}")?;
    out.flush().context("failed to flush prompt")?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
