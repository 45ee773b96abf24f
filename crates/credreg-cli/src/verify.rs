//! # Verify Subcommand
//!
//! Public verification lookup. Needs no session token. Exits 0 for a
//! valid certificate and 1 otherwise.

use anyhow::{Context, Result};
use clap::Args;

use credreg_core::CertificateId;

use crate::{render, RegistryArgs};

/// Arguments for `credreg verify`.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Identifier of the certificate to verify.
    #[arg(value_name = "ID")]
    pub id: CertificateId,

    /// Print the registry's answer as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute `credreg verify`.
pub async fn run_verify(args: &VerifyArgs, registry: &RegistryArgs) -> Result<u8> {
    let client = registry.client()?;
    let result = client
        .certificates()
        .verify(&args.id)
        .await
        .with_context(|| format!("verification lookup for {} failed", args.id))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to encode result")?
        );
    } else {
        println!("{}", render::verification(&result));
    }
    Ok(if result.valid { 0 } else { 1 })
}
