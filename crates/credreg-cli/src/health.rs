//! # Health Subcommand
//!
//! Prints the registry's self-reported status and per-service states.

use anyhow::{Context, Result};

use credreg_registry_client::HealthReport;

use crate::RegistryArgs;

/// Execute `credreg health`. Exits 0 only when the registry reports
/// itself healthy.
pub async fn run_health(registry: &RegistryArgs) -> Result<u8> {
    let client = registry.client()?;
    let report = client
        .health()
        .await
        .with_context(|| format!("health check against {} failed", client.base_url()))?;
    println!("{}", render_health(&report));
    Ok(if report.is_healthy() { 0 } else { 1 })
}

fn render_health(report: &HealthReport) -> String {
    let mut lines = vec![format!(
        "Registry {}{}",
        report.status,
        report
            .version
            .as_deref()
            .map(|v| format!(" (version {v})"))
            .unwrap_or_default()
    )];
    lines.extend(
        report
            .services
            .iter()
            .map(|(name, state)| format!("  {name}: {state}")),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_services_sorted() {
        let report = HealthReport {
            status: "degraded".into(),
            timestamp: None,
            version: Some("1.0.0".into()),
            services: [("database", "offline"), ("api", "online")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        assert_eq!(
            render_health(&report),
            "Registry degraded (version 1.0.0)\n  api: online\n  database: offline"
        );
    }
}
