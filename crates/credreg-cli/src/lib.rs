//! # credreg-cli: Command-Line Console for the Credential Registry
//!
//! Provides the `credreg` command-line interface.
//!
//! ## Subcommands
//!
//! - `credreg list`: Filtered certificate listing (table or JSON).
//! - `credreg export`: Write the filtered view as a CSV file.
//! - `credreg revoke`: Revoke one certificate after confirmation.
//! - `credreg verify`: Public verification lookup.
//! - `credreg health`: Registry health report.
//! - `credreg shell`: Interactive session with search history, quick
//!   filters and the confirm/cancel revocation flow.
//!
//! ```bash
//! credreg list --status active --search "computer" --field degree
//! credreg export --quick this-year --output-dir ./exports
//! credreg revoke CERT-2025-001
//! ```
//!
//! Registry connection settings come from `CREDREG_*` environment
//! variables and may be overridden with `--registry-url`, `--token` and
//! `--timeout-secs`.

pub mod export;
pub mod filters;
pub mod health;
pub mod list;
pub mod render;
pub mod revoke;
pub mod shell;
pub mod verify;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use credreg_core::RecordSource;
use credreg_engine::Console;
use credreg_registry_client::{RegistryClient, RegistryConfig};

/// Registry connection overrides shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Registry base URL (overrides CREDREG_REGISTRY_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub registry_url: Option<String>,

    /// Administrator session token (overrides CREDREG_API_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Request timeout in seconds (overrides CREDREG_TIMEOUT_SECS).
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl RegistryArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Result<RegistryConfig> {
        let mut config = RegistryConfig::from_env().context("invalid registry configuration")?;
        if let Some(url) = &self.registry_url {
            config = config
                .with_base_url(url)
                .context("invalid --registry-url")?;
        }
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        if let Some(secs) = self.timeout_secs {
            anyhow::ensure!(secs > 0, "--timeout-secs must be positive");
            config = config.with_timeout_secs(secs);
        }
        tracing::debug!(?config, "resolved registry configuration");
        Ok(config)
    }

    /// Build a registry client from [`RegistryArgs::config`].
    pub fn client(&self) -> Result<RegistryClient> {
        RegistryClient::new(self.config()?).context("failed to build registry client")
    }
}

/// The local calendar day, used as the reference for quick filters and
/// export file names.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Create a console and load the registry listing into it.
///
/// # Errors
///
/// Fails with the console's user-facing message and the underlying cause
/// when the listing cannot be loaded.
pub async fn load_console<S: RecordSource>(source: &S) -> Result<Console> {
    let console = Console::new();
    if let Err(e) = console.load(source).await {
        let notice = console
            .notice()
            .map(|n| n.message)
            .unwrap_or_else(|| "Failed to load certificates.".to_string());
        anyhow::bail!("{notice} ({e})");
    }
    Ok(console)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory registry double shared by the subcommand tests.

    use std::future::Future;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::NaiveDate;
    use credreg_core::{
        CertificateId, CertificateRecord, CertificateStatus, RecordSource, RevokeTransport,
        TransportError,
    };

    pub(crate) fn record(
        id: &str,
        student: &str,
        degree: &str,
        (y, m, d): (i32, u32, u32),
    ) -> CertificateRecord {
        CertificateRecord::new(
            CertificateId::new(id).unwrap(),
            student,
            degree,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )
    }

    pub(crate) fn sample_records() -> Vec<CertificateRecord> {
        vec![
            record("CERT-001", "Alice Johnson", "Computer Science", (2025, 1, 5)),
            record("CERT-002", "Bob Stone", "Physics", (2024, 6, 15)),
            record("CERT-003", "Carol King", "History", (2023, 9, 1))
                .with_status(CertificateStatus::Revoked),
        ]
    }

    /// Serves a fixed listing and records revoke calls.
    #[derive(Default)]
    pub(crate) struct FakeRegistry {
        pub(crate) records: Vec<CertificateRecord>,
        pub(crate) fail_fetch: AtomicBool,
        pub(crate) fail_revoke: AtomicBool,
        pub(crate) revoke_calls: AtomicUsize,
    }

    impl FakeRegistry {
        pub(crate) fn new(records: Vec<CertificateRecord>) -> Self {
            Self {
                records,
                ..Self::default()
            }
        }
    }

    impl RecordSource for FakeRegistry {
        fn fetch_all(
            &self,
        ) -> impl Future<Output = Result<Vec<CertificateRecord>, TransportError>> + Send {
            async move {
                if self.fail_fetch.load(Ordering::SeqCst) {
                    Err(TransportError::new("connection refused"))
                } else {
                    Ok(self.records.clone())
                }
            }
        }
    }

    impl RevokeTransport for FakeRegistry {
        fn revoke(
            &self,
            _id: &CertificateId,
        ) -> impl Future<Output = Result<(), TransportError>> + Send {
            async move {
                self.revoke_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_revoke.load(Ordering::SeqCst) {
                    Err(TransportError::new("registry returned 500"))
                } else {
                    Ok(())
                }
            }
        }
    }
}
