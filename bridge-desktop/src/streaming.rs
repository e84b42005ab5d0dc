//! Streaming Client Implementation using Reqwest
//!
//! Maps remote nodes onto a streaming gateway (a local streaming proxy on
//! desktop, or a remote edge) and pre-fetches the first bytes of a resolved
//! URL so playback starts from a warm connection.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media::MediaNode,
    streaming::{PlayableUrl, StreamingClient},
};
use core_async::time::sleep;
use reqwest::{header::RANGE, Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_WARM_UP_BYTES: u64 = 256 * 1024;

/// Retry policy for warm-up requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Reqwest-based streaming client
///
/// Authenticated nodes resolve to `{base}/stream/{handle}/{name}`; nodes
/// reached through a public folder link resolve to
/// `{base}/link/{handle}/{name}?key={folder_link_key}`.
pub struct HttpStreamingClient {
    client: Client,
    base_url: Url,
    folder_link_key: Option<String>,
    warm_up_bytes: u64,
    retry_policy: RetryPolicy,
}

impl HttpStreamingClient {
    /// Create a new streaming client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .user_agent("playback-core/0.1.0")
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Self::with_client(client, base_url)
    }

    /// Create a streaming client around an existing reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| {
            BridgeError::OperationFailed(format!("Invalid streaming base URL: {}", e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BridgeError::OperationFailed(
                "Streaming base URL cannot carry a path".to_string(),
            ));
        }
        // Trailing slashes would produce empty path segments on push.
        base_url
            .path_segments_mut()
            .map_err(|_| BridgeError::OperationFailed("Invalid streaming base URL".into()))?
            .pop_if_empty();

        Ok(Self {
            client,
            base_url,
            folder_link_key: None,
            warm_up_bytes: DEFAULT_WARM_UP_BYTES,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Key appended to folder-link URLs
    pub fn with_folder_link_key(mut self, key: impl Into<String>) -> Self {
        self.folder_link_key = Some(key.into());
        self
    }

    /// Number of leading bytes fetched by `warm_up` (0 disables warm-up)
    pub fn with_warm_up_bytes(mut self, bytes: u64) -> Self {
        self.warm_up_bytes = bytes;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn build_url(&self, node: &MediaNode, is_folder_link: bool) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| BridgeError::OperationFailed("Invalid streaming base URL".into()))?;
            segments.push(if is_folder_link { "link" } else { "stream" });
            segments.push(&node.handle.to_string());
            if !node.name.is_empty() {
                segments.push(&node.name);
            }
        }

        if is_folder_link {
            let key = self.folder_link_key.as_deref().ok_or_else(|| {
                BridgeError::NotAvailable("folder link key not configured".to_string())
            })?;
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let policy = &self.retry_policy;
        let factor = policy.backoff_multiplier.powi(attempt as i32);
        policy
            .initial_delay
            .mul_f64(factor)
            .min(policy.max_delay)
    }
}

#[async_trait]
impl StreamingClient for HttpStreamingClient {
    async fn resolve_playable_url(
        &self,
        node: &MediaNode,
        is_folder_link: bool,
    ) -> Result<PlayableUrl> {
        let url = self.build_url(node, is_folder_link)?;
        let playable = PlayableUrl::new(url.to_string());

        debug!(
            handle = %node.handle,
            is_folder_link,
            url = %playable,
            "Resolved playable URL"
        );

        Ok(playable)
    }

    async fn warm_up(&self, url: &PlayableUrl) -> Result<()> {
        if self.warm_up_bytes == 0 {
            return Ok(());
        }

        let range = format!("bytes=0-{}", self.warm_up_bytes - 1);
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < self.retry_policy.max_attempts {
            debug!(
                attempt = attempt + 1,
                max_attempts = self.retry_policy.max_attempts,
                url = %url,
                "Warming up stream"
            );

            match self
                .client
                .get(url.as_str())
                .header(RANGE, range.as_str())
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if status >= 500 || status == 429 {
                        warn!(
                            status = status,
                            attempt = attempt + 1,
                            "Warm-up failed with retryable status"
                        );
                        last_error = Some(BridgeError::OperationFailed(format!(
                            "HTTP {} error",
                            status
                        )));
                    } else if !response.status().is_success() {
                        return Err(BridgeError::OperationFailed(format!(
                            "HTTP {} error",
                            status
                        )));
                    } else {
                        let body = response.bytes().await.map_err(|e| {
                            BridgeError::OperationFailed(format!(
                                "Failed to read warm-up body: {}",
                                e
                            ))
                        })?;
                        debug!(status, bytes = body.len(), "Stream warmed up");
                        return Ok(());
                    }
                }
                Err(e) => {
                    // Redact: reqwest errors embed the full URL, key included.
                    let e = e.without_url();
                    warn!(error = %e, attempt = attempt + 1, "Warm-up request failed");
                    last_error = Some(BridgeError::OperationFailed(format!(
                        "Warm-up request failed: {}",
                        e
                    )));
                }
            }

            attempt += 1;

            if attempt < self.retry_policy.max_attempts {
                let delay = self.backoff_delay(attempt - 1);
                debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BridgeError::OperationFailed("Max retry attempts exceeded".to_string())
        }))
    }

    fn name(&self) -> &str {
        "http-streaming"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::media::NodeHandle;

    fn node() -> MediaNode {
        MediaNode::new(NodeHandle(0xABCD), "holiday clip.mp4")
    }

    #[tokio::test]
    async fn test_resolve_authenticated_node() {
        let client = HttpStreamingClient::new("http://127.0.0.1:4443/").unwrap();
        let url = client.resolve_playable_url(&node(), false).await.unwrap();

        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:4443/stream/000000000000abcd/holiday%20clip.mp4"
        );
    }

    #[tokio::test]
    async fn test_resolve_folder_link_node_appends_key() {
        let client = HttpStreamingClient::new("https://edge.example.com/v1")
            .unwrap()
            .with_folder_link_key("s3cr3t");
        let url = client.resolve_playable_url(&node(), true).await.unwrap();

        assert!(url
            .as_str()
            .starts_with("https://edge.example.com/v1/link/000000000000abcd/"));
        assert!(url.as_str().ends_with("?key=s3cr3t"));
        assert!(!url.redacted().contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_folder_link_without_key_is_unavailable() {
        let client = HttpStreamingClient::new("http://127.0.0.1:4443").unwrap();
        let result = client.resolve_playable_url(&node(), true).await;

        assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
    }

    #[tokio::test]
    async fn test_zero_warm_up_bytes_is_noop() {
        let client = HttpStreamingClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_warm_up_bytes(0);
        let url = PlayableUrl::new("http://127.0.0.1:9/stream/1");

        assert!(client.warm_up(&url).await.is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpStreamingClient::new("not a url").is_err());
        assert!(HttpStreamingClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_backoff_is_capped() {
        let client = HttpStreamingClient::new("http://127.0.0.1:4443")
            .unwrap()
            .with_retry_policy(RetryPolicy {
                max_attempts: 5,
                initial_delay: Duration::from_millis(100),
                max_delay: Duration::from_millis(300),
                backoff_multiplier: 2.0,
            });

        assert_eq!(client.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(client.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(client.backoff_delay(4), Duration::from_millis(300));
    }
}
