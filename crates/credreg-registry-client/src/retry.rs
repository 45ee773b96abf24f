//! Resending registry requests after transport failures.
//!
//! Reads are resent after any transport failure. A revocation is resent
//! only when the connection could not be opened at all: once the DELETE
//! may have reached the registry, a second attempt would be answered with
//! "already revoked" even though the first one succeeded.

use std::future::Future;
use std::time::Duration;

/// Attempts after the first one.
const MAX_RETRIES: u32 = 3;

/// First backoff step; doubles per attempt (200ms, 400ms, 800ms).
const BASE_DELAY: Duration = Duration::from_millis(200);

/// When a request that failed in transport may be sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Idempotent request: resend after any transport failure.
    Always,
    /// State-changing request: resend only if it never left the client.
    ConnectFailureOnly,
}

impl Replay {
    fn permits(self, err: &reqwest::Error) -> bool {
        match self {
            Replay::Always => true,
            Replay::ConnectFailureOnly => err.is_connect(),
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    BASE_DELAY * 2u32.pow(attempt)
}

/// Send a request built by `f`, resending as `replay` permits.
pub(crate) async fn send<F, Fut>(
    endpoint: &str,
    replay: Replay,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < MAX_RETRIES && replay.permits(&e) => {
                let delay = backoff(attempt);
                attempt += 1;
                tracing::warn!(
                    endpoint,
                    attempt,
                    ?delay,
                    error = %e,
                    "registry request failed, resending"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(timeout_ms: u64) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap()
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(0), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn refused_connection_is_resent_for_both_policies() {
        for replay in [Replay::Always, Replay::ConnectFailureOnly] {
            let calls = AtomicU32::new(0);
            let http = client(50);
            let result = send("GET /", replay, || {
                calls.fetch_add(1, Ordering::SeqCst);
                // Nothing listens on port 1.
                http.get("http://127.0.0.1:1/").send()
            })
            .await;
            assert!(result.is_err());
            assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1, "{replay:?}");
        }
    }

    #[tokio::test]
    async fn timed_out_state_change_is_sent_once() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let calls = AtomicU32::new(0);
        let http = client(100);
        let url = format!("{}/delete_certificate/A", server.uri());
        let err = send("DELETE /delete_certificate/A", Replay::ConnectFailureOnly, || {
            calls.fetch_add(1, Ordering::SeqCst);
            http.delete(url.as_str()).send()
        })
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timed_out_read_is_resent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let calls = AtomicU32::new(0);
        let http = client(100);
        let resp = send("GET /certificates", Replay::Always, || {
            calls.fetch_add(1, Ordering::SeqCst);
            http.get(server.uri()).send()
        })
        .await
        .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
