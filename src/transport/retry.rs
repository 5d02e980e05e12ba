// ABOUTME: Bounded, explicit retry of idempotent reads.
// ABOUTME: Only GET requests are retried, on transient transport errors and 5xx responses.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{Method, Request, Response, Transport, TransportError};

/// How many extra attempts a GET gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default = "default_delay", with = "humantime_serde")]
    pub delay: Duration,
}

fn default_delay() -> Duration {
    Duration::from_secs(1)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 0,
            delay: default_delay(),
        }
    }
}

/// Wraps a transport and retries idempotent reads according to a [`RetryPolicy`].
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        if request.method != Method::Get || self.policy.attempts == 0 {
            return self.inner.send(request).await;
        }

        let mut attempt = 0;
        loop {
            let result = self.inner.send(request.clone()).await;
            let retry = match &result {
                Ok(response) => response.is_server_error(),
                Err(err) => err.is_transient(),
            };
            if !retry || attempt >= self.policy.attempts {
                return result;
            }
            attempt += 1;
            match &result {
                Ok(response) => tracing::warn!(
                    url = %request.url,
                    status = response.status,
                    attempt,
                    "server error, retrying"
                ),
                Err(err) => tracing::warn!(url = %request.url, error = %err, attempt, "retrying"),
            }
            tokio::time::sleep(self.policy.delay).await;
        }
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
