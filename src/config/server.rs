// ABOUTME: RM server connection settings.
// ABOUTME: Validates the server URL and resolves credentials for form login.

use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::EnvValue;
use super::deserialize::deserialize_url;
use crate::error::{Error, Result};
use crate::transport::HttpSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// RM application URL, e.g. `https://clm.example.com:9443/rm`.
    #[serde(deserialize_with = "deserialize_url")]
    pub url: Url,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<EnvValue>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

pub(crate) fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Parse an http(s) URL with a host and drop a trailing slash from its path.
pub(crate) fn validate_url(url: &str) -> std::result::Result<Url, String> {
    let raw = url.trim();
    let mut url = Url::parse(raw).map_err(|e| format!("invalid server url '{raw}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("server url must use http or https: {raw}"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("server url has no host: {raw}"));
    }
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
    }
    Ok(url)
}

/// Resolved login for one run.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl ServerConfig {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: validate_url(url).map_err(Error::InvalidConfig)?,
            user: None,
            password: None,
            accept_invalid_certs: false,
            request_timeout: default_request_timeout(),
        })
    }

    /// Server URL without a trailing slash, the base for every request path.
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let user = self
            .user
            .clone()
            .ok_or_else(|| Error::InvalidConfig("no user configured".to_string()))?;
        let password = self
            .password
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no password configured".to_string()))?
            .resolve()?;
        Ok(Credentials { user, password })
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            accept_invalid_certs: self.accept_invalid_certs,
            request_timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_trimmed() {
        let url = validate_url(" https://clm.example.com:9443/rm/ ").unwrap();
        assert_eq!(url.as_str(), "https://clm.example.com:9443/rm");
        assert_eq!(url.host_str(), Some("clm.example.com"));
        assert_eq!(url.port(), Some(9443));
    }

    #[test]
    fn url_requires_scheme_and_host() {
        assert!(validate_url("clm.example.com/rm").is_err());
        assert!(validate_url("ftp://clm.example.com/rm").is_err());
        assert!(validate_url("https://").is_err());
    }

    #[test]
    fn malformed_urls_are_rejected() {
        for url in [
            "https://:9443/rm",
            "https://clm example.com/rm",
            "https://host:notaport/rm",
        ] {
            assert!(validate_url(url).is_err(), "{url}");
        }
    }

    #[test]
    fn base_url_of_bare_host_has_no_trailing_slash() {
        let server = ServerConfig::new("https://clm.example.com").unwrap();
        assert_eq!(server.base_url(), "https://clm.example.com");
    }

    #[test]
    fn credentials_require_user_and_password() {
        let mut server = ServerConfig::new("https://clm.example.com/rm").unwrap();
        assert!(server.credentials().is_err());

        server.user = Some("alice".to_string());
        server.password = Some(EnvValue::Literal("pw".to_string()));
        let credentials = server.credentials().unwrap();
        assert_eq!(credentials.user, "alice");
        assert!(!format!("{credentials:?}").contains("pw"));
    }
}
