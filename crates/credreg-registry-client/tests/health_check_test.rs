//! Tests for RegistryClient::health().
//!
//! Uses wiremock for the reachable cases and a closed port for the
//! unreachable one.

use credreg_registry_client::{RegistryClient, RegistryConfig, RegistryError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base: &str) -> RegistryClient {
    let config = RegistryConfig {
        base_url: base.parse().unwrap(),
        api_token: None,
        timeout_secs: 1,
    };
    RegistryClient::new(config).unwrap()
}

#[tokio::test]
async fn health_reports_services() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": false,
            "message": "System health check completed",
            "data": {
                "status": "healthy",
                "timestamp": "2026-10-19T08:00:00",
                "version": "1.0.0",
                "services": { "database": "online", "blockchain": "valid", "api": "online" },
                "metrics": { "total_certificates": 3, "total_users": 2, "blockchain_blocks": 4 }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/api", mock_server.uri()));
    let report = client.health().await.unwrap();
    assert!(report.is_healthy());
    assert_eq!(report.version.as_deref(), Some("1.0.0"));
    assert_eq!(report.services.get("database").map(String::as_str), Some("online"));
}

#[tokio::test]
async fn degraded_registry_is_not_healthy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": false,
            "message": "System health check completed",
            "data": {
                "status": "degraded",
                "services": { "database": "offline", "blockchain": "valid", "api": "online" }
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/api", mock_server.uri()));
    let report = client.health().await.unwrap();
    assert!(!report.is_healthy());
    assert_eq!(report.services.get("database").map(String::as_str), Some("offline"));
}

#[tokio::test]
async fn failing_health_check_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": true,
            "message": "Health check failed: disk I/O error",
            "status": "unhealthy"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/api", mock_server.uri()));
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, RegistryError::ApiError { status: 500, .. }));
    assert!(err.to_string().contains("disk I/O error"));
}

#[tokio::test]
async fn unreachable_registry_is_http_error() {
    // Closed port: every attempt is refused and retried before giving up.
    let client = client_for("http://127.0.0.1:1/api");
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, RegistryError::Http { .. }), "got {err:?}");
}
