// ABOUTME: In-memory transport answering from per-route response queues.
// ABOUTME: Records every request so tests can assert on what was sent.

use async_trait::async_trait;
use dngcm::transport::{Method, Request, Response, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;

pub const BASE: &str = "https://clm.example.com/rm";

struct Route {
    method: Method,
    url: String,
    queue: VecDeque<Response>,
    last: Option<Response>,
}

/// Answers requests by exact method and URL.
///
/// Responses queued for a route are served in order; the last one repeats
/// once the queue is drained. Unscripted requests fail with a simulated
/// transport error.
pub struct ScriptedTransport {
    base_url: String,
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<Request>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new(BASE)
    }
}

impl ScriptedTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            routes: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on(&self, method: Method, url: &str, response: Response) -> &Self {
        let mut routes = self.routes.lock();
        match routes.iter_mut().find(|r| r.method == method && r.url == url) {
            Some(route) => route.queue.push_back(response),
            None => routes.push(Route {
                method,
                url: url.to_string(),
                queue: VecDeque::from([response]),
                last: None,
            }),
        }
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// Number of requests sent with `method` to exactly `url`.
    pub fn sent(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// Number of requests sent with `method` to a URL containing `fragment`.
    pub fn sent_containing(&self, method: Method, fragment: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url.contains(fragment))
            .count()
    }

    /// The only request sent with `method` to `url`.
    pub fn single(&self, method: Method, url: &str) -> Request {
        let matching: Vec<Request> = self
            .requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .cloned()
            .collect();
        assert_eq!(matching.len(), 1, "expected one {method} {url}, got {}", matching.len());
        matching.into_iter().next().unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.requests.lock().push(request.clone());

        let mut routes = self.routes.lock();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.url == request.url);
        let Some(route) = route else {
            return Err(TransportError::Simulated {
                method: request.method,
                url: request.url,
            });
        };
        if let Some(response) = route.queue.pop_front() {
            route.last = Some(response.clone());
            return Ok(response);
        }
        match &route.last {
            Some(response) => Ok(response.clone()),
            None => Err(TransportError::Simulated {
                method: request.method,
                url: request.url,
            }),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
