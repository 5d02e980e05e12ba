// ABOUTME: Fault-injection wrapper for any transport.
// ABOUTME: Answers matching requests with a synthetic status or a simulated failure.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::SimulatedSnafu;
use super::{Method, Request, Response, Transport, TransportError};

/// What to do instead of sending a matching request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Answer with this status and an empty body.
    Status(u16),
    /// Fail as if the connection broke.
    Fail,
}

/// Matches requests by method and URL substring.
#[derive(Debug, Clone)]
pub struct FaultRule {
    method: Method,
    url_contains: String,
    fault: Fault,
}

impl FaultRule {
    pub fn new(method: Method, url_contains: impl Into<String>, fault: Fault) -> Self {
        Self {
            method,
            url_contains: url_contains.into(),
            fault,
        }
    }

    fn matches(&self, request: &Request) -> bool {
        request.method == self.method && request.url.contains(&self.url_contains)
    }
}

/// Transport wrapper that short-circuits requests matching a [`FaultRule`].
///
/// Requests that match no rule go to the inner transport unchanged. Every
/// injected fault is recorded as `"<METHOD> <url>"`.
pub struct FaultInjector<T> {
    inner: T,
    rules: Vec<FaultRule>,
    injected: Mutex<Vec<String>>,
}

impl<T> FaultInjector<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            rules: Vec::new(),
            injected: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rule(mut self, rule: FaultRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn injected(&self) -> Vec<String> {
        self.injected.lock().clone()
    }
}

#[async_trait]
impl<T: Transport> Transport for FaultInjector<T> {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let Some(rule) = self.rules.iter().find(|rule| rule.matches(&request)) else {
            return self.inner.send(request).await;
        };

        tracing::info!(method = %request.method, url = %request.url, fault = ?rule.fault, "injecting fault");
        self.injected
            .lock()
            .push(format!("{} {}", request.method, request.url));

        match rule.fault {
            Fault::Status(status) => Ok(Response::new(status)),
            Fault::Fail => SimulatedSnafu {
                method: request.method,
                url: request.url,
            }
            .fail(),
        }
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
