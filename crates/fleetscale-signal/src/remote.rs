//! Remote demand provider.
//!
//! Fetches the latest aggregate demand figure from a configured HTTP
//! endpoint. Every call is bounded by a timeout, and transient
//! failures fall back to the last cached sample (flagged stale) so the
//! control loop stays live through brief provider outages.

use std::time::Duration;

use tracing::{debug, warn};

use fleetscale_core::{DemandSample, EnvError, EnvResult};

/// HTTP signal provider with a one-sample fallback cache.
#[derive(Debug)]
pub struct RemoteProvider {
    url: String,
    timeout: Duration,
    /// Last successfully fetched sample, used as a stale fallback.
    cached: Option<DemandSample>,
}

impl RemoteProvider {
    /// Create a provider for the given endpoint URL.
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            url,
            timeout,
            cached: None,
        }
    }

    /// Fetch the current demand, falling back to the cached sample on
    /// transient failure.
    ///
    /// Fails with `SignalUnavailable` only when the fetch fails and no
    /// cached sample exists (typically the very first tick).
    pub async fn fetch(&mut self, elapsed_secs: u64) -> EnvResult<DemandSample> {
        match self.fetch_once().await {
            Ok(value) => {
                let sample = DemandSample::fresh(elapsed_secs, value);
                self.cached = Some(sample);
                Ok(sample)
            }
            Err(reason) => match self.cached {
                Some(cached) => {
                    warn!(
                        url = %self.url,
                        %reason,
                        cached_value = cached.raw_value,
                        "demand fetch failed, serving cached sample"
                    );
                    Ok(cached.as_stale(elapsed_secs))
                }
                None => Err(EnvError::SignalUnavailable(reason)),
            },
        }
    }

    /// One GET against the endpoint, parsed as a numeric demand figure.
    async fn fetch_once(&self) -> Result<f64, String> {
        let result = tokio::time::timeout(self.timeout, self.request()).await;
        match result {
            Ok(inner) => inner,
            Err(_) => Err(format!("timed out after {:?}", self.timeout)),
        }
    }

    async fn request(&self) -> Result<f64, String> {
        let uri: http::Uri = self
            .url
            .parse()
            .map_err(|e| format!("invalid url {}: {e}", self.url))?;
        let authority = uri
            .authority()
            .ok_or_else(|| format!("url has no authority: {}", self.url))?
            .clone();
        let address = match authority.port_u16() {
            Some(_) => authority.as_str().to_string(),
            None => format!("{}:80", authority.as_str()),
        };
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let stream = tokio::net::TcpStream::connect(&address)
            .await
            .map_err(|e| format!("connect {address}: {e}"))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| format!("handshake: {e}"))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(&path)
            .header("host", authority.as_str())
            .header("user-agent", "fleetscale-signal/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| format!("build request: {e}"))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| format!("request: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("provider returned {}", resp.status()));
        }

        use http_body_util::BodyExt;
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| format!("read body: {e}"))?
            .to_bytes();
        let text = String::from_utf8_lossy(&body);

        let value = parse_demand(&text)
            .ok_or_else(|| format!("non-numeric demand payload: {:?}", text.trim()))?;
        debug!(url = %self.url, demand = value, "demand fetched");
        Ok(value)
    }
}

/// Extract a demand figure from a response body.
///
/// Accepts any payload whose trimmed text parses as a finite float,
/// which covers plain numbers and bare JSON numbers.
fn parse_demand(body: &str) -> Option<f64> {
    let value: f64 = body.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serve `responses` HTTP bodies on a fresh listener, one per
    /// connection, then stop accepting.
    async fn stub_provider(responses: Vec<String>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for body in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {}\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
            }
        });
        format!("http://{addr}/demand")
    }

    #[test]
    fn parse_plain_number() {
        assert_eq!(parse_demand("42.5"), Some(42.5));
        assert_eq!(parse_demand("  70 \n"), Some(70.0));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert_eq!(parse_demand("not a number"), None);
        assert_eq!(parse_demand(""), None);
        assert_eq!(parse_demand("NaN"), None);
        assert_eq!(parse_demand("inf"), None);
    }

    #[tokio::test]
    async fn fetches_numeric_payload() {
        let url = stub_provider(vec!["83.5".to_string()]).await;
        let mut provider = RemoteProvider::new(url, Duration::from_secs(2));

        let sample = provider.fetch(60).await.unwrap();
        assert_eq!(sample.raw_value, 83.5);
        assert_eq!(sample.epoch_secs, 60);
        assert!(!sample.stale);
    }

    #[tokio::test]
    async fn falls_back_to_cache_when_provider_dies() {
        // One good response, then the stub stops accepting.
        let url = stub_provider(vec!["55".to_string()]).await;
        let mut provider = RemoteProvider::new(url, Duration::from_millis(500));

        let first = provider.fetch(60).await.unwrap();
        assert_eq!(first.raw_value, 55.0);

        let second = provider.fetch(120).await.unwrap();
        assert_eq!(second.raw_value, 55.0);
        assert_eq!(second.epoch_secs, 120);
        assert!(second.stale);
    }

    #[tokio::test]
    async fn cold_failure_is_signal_unavailable() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut provider = RemoteProvider::new(
            format!("http://{addr}/demand"),
            Duration::from_millis(500),
        );
        let err = provider.fetch(0).await.unwrap_err();
        assert!(matches!(err, EnvError::SignalUnavailable(_)));
    }

    #[tokio::test]
    async fn non_numeric_body_counts_as_failure() {
        let url = stub_provider(vec!["oops".to_string()]).await;
        let mut provider = RemoteProvider::new(url, Duration::from_secs(2));

        let err = provider.fetch(0).await.unwrap_err();
        assert!(matches!(err, EnvError::SignalUnavailable(_)));
    }
}
