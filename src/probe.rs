//! Readiness probing of the inference server

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ProbeConfig;

/// A single reachability check
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, url: &str) -> bool;
}

/// Probe issuing an HTTP GET; any 2xx response means ready
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                debug!(url, status = %response.status(), "probe response");
                response.status().is_success()
            }
            Err(e) => {
                debug!(url, "probe failed: {}", e);
                false
            }
        }
    }
}

/// Poll `url` with exponential backoff until it answers or attempts run out
///
/// Returns `false` on exhaustion.
pub async fn wait_ready<P: Probe + ?Sized>(probe: &P, url: &str, config: &ProbeConfig) -> bool {
    for attempt in 0..config.attempts {
        tokio::time::sleep(config.delay_for(attempt)).await;

        if probe.check(url).await {
            debug!(url, attempt = attempt + 1, "service ready");
            return true;
        }
        debug!(url, attempt = attempt + 1, "service not ready yet");
    }

    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;

    use super::*;

    /// Answers ready from call number `ready_after` on
    struct CountingProbe {
        calls: AtomicU32,
        ready_after: u32,
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn check(&self, _url: &str) -> bool {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            call >= self.ready_after
        }
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ready_succeeds_after_retries() {
        let probe = CountingProbe {
            calls: AtomicU32::new(0),
            ready_after: 3,
        };
        let config = ProbeConfig::default();

        let start = tokio::time::Instant::now();
        assert!(wait_ready(&probe, "http://unused", &config).await);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        // 500 + 1000 + 2000 ms of backoff
        assert!(start.elapsed() >= Duration::from_millis(3_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ready_gives_up() {
        let probe = CountingProbe {
            calls: AtomicU32::new(0),
            ready_after: u32::MAX,
        };
        let config = ProbeConfig {
            attempts: 4,
            ..Default::default()
        };

        assert!(!wait_ready(&probe, "http://unused", &config).await);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_http_probe_ok() {
        let app = Router::new().route("/api/tags", get(|| async { r#"{"models":[]}"# }));
        let base = serve(app).await;

        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
        assert!(probe.check(&format!("{}/api/tags", base)).await);
    }

    #[tokio::test]
    async fn test_http_probe_error_status() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "starting") }),
        );
        let base = serve(app).await;

        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
        assert!(!probe.check(&format!("{}/api/tags", base)).await);
        assert!(!probe.check(&format!("{}/missing", base)).await);
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
        assert!(!probe.check(&format!("http://{}/api/tags", addr)).await);
    }
}
