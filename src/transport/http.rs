// ABOUTME: reqwest-backed transport with a cookie session and Jazz form login.
// ABOUTME: Adds the DNG public request-type header to every request.

use async_trait::async_trait;
use reqwest::Url;
use snafu::ResultExt;
use std::time::Duration;

use super::error::{AuthenticationSnafu, BodySnafu, ClientSnafu, InvalidUrlSnafu, SendSnafu};
use super::{Method, Request, Response, Transport, TransportError};
use crate::oslc::vocab::{header, media};

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub accept_invalid_certs: bool,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Live transport against an RM server.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, settings: &HttpSettings) -> Result<Self, TransportError> {
        let base = Url::parse(base_url.trim()).map_err(|e| {
            InvalidUrlSnafu {
                url: base_url,
                message: e.to_string(),
            }
            .build()
        })?;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .timeout(settings.request_timeout)
            .build()
            .context(ClientSnafu)?;
        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            base,
        })
    }

    /// Authenticate with Jazz form-based login against the JTS.
    ///
    /// The session cookie lands in the client's cookie store and is sent on
    /// every later request.
    pub async fn login(&self, user: &str, password: &str) -> Result<(), TransportError> {
        let jts = jts_url(&self.base);
        let jts = jts.as_str().trim_end_matches('/');

        let identity = format!("{jts}/authenticated/identity");
        let response = self.send(Request::get(&identity)).await?;
        tracing::debug!(status = response.status, "identity check");

        let check = format!("{jts}/j_security_check");
        let form = format!(
            "j_username={}&j_password={}",
            urlencoding::encode(user),
            urlencoding::encode(password)
        );
        let response = self
            .send(Request::post(&check).content_type(media::FORM).body(form))
            .await?;

        let failed = response
            .header(header::AUTH_MSG)
            .is_some_and(|msg| msg.eq_ignore_ascii_case(header::AUTH_FAILED));
        if failed || response.status == 401 {
            return AuthenticationSnafu {
                user: user.to_string(),
                url: check,
            }
            .fail();
        }

        tracing::info!(user, server = %self.base_url, "logged in");
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(header::REQUEST_TYPE, header::REQUEST_TYPE_PUBLIC);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send().await.context(SendSnafu {
            method: request.method,
            url: request.url.clone(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.context(BodySnafu {
            url: request.url.clone(),
        })?;
        tracing::debug!(status, url = %request.url, "received response");

        Ok(Response {
            status,
            headers,
            body,
        })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// JTS URL for an RM application URL: the first `rm` path segment becomes `jts`.
///
/// `https://clm.example.com:9443/rm` gives `https://clm.example.com:9443/jts`.
/// Without an `rm` segment the JTS sits at the server root.
pub fn jts_url(rm_url: &Url) -> Url {
    let segments: Vec<String> = rm_url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let rm_at = segments.iter().position(|s| s == "rm");

    let mut jts = rm_url.clone();
    jts.set_query(None);
    jts.set_fragment(None);
    if let Ok(mut path) = jts.path_segments_mut() {
        path.clear();
        match rm_at {
            Some(at) => {
                for (i, segment) in segments.iter().enumerate() {
                    path.push(if i == at { "jts" } else { segment.as_str() });
                }
            }
            None => {
                path.push("jts");
            }
        }
    }
    jts
}
