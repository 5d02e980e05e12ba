// ABOUTME: Configuration types and parsing for dngcm.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and command-line overrides.

mod deserialize;
mod env_value;
mod init;
mod server;

pub use env_value::EnvValue;
pub use init::init_config;
pub use server::{Credentials, ServerConfig};

use crate::error::{Error, Result};
use crate::tracker::{PollPolicy, VerdictPolicy, WaitOptions};
use crate::transport::RetryPolicy;
use serde::Deserialize;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub const CONFIG_FILENAME: &str = "dngcm.yml";
pub const CONFIG_FILENAME_ALT: &str = "dngcm.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dngcm/config.yml";

const TEMPLATE_URL: &str = "https://clm.example.com:9443/rm";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,

    #[serde(default, deserialize_with = "deserialize::deserialize_poll_policy")]
    pub polling: PollPolicy,

    #[serde(default)]
    pub verdicts: VerdictPolicies,

    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Verdict policy per tracked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VerdictPolicies {
    #[serde(default = "default_delivery_policy")]
    pub delivery: VerdictPolicy,
    #[serde(default = "default_type_import_policy")]
    pub type_import: VerdictPolicy,
    #[serde(default = "default_changeset_policy")]
    pub changeset: VerdictPolicy,
}

fn default_delivery_policy() -> VerdictPolicy {
    VerdictPolicy::Strict
}

fn default_type_import_policy() -> VerdictPolicy {
    VerdictPolicy::RejectErrors
}

fn default_changeset_policy() -> VerdictPolicy {
    VerdictPolicy::Strict
}

impl Default for VerdictPolicies {
    fn default() -> Self {
        Self {
            delivery: default_delivery_policy(),
            type_import: default_type_import_policy(),
            changeset: default_changeset_policy(),
        }
    }
}

/// Values given on the command line, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Config built from command-line values alone, used when no file exists.
    pub fn from_overrides(overrides: &Overrides) -> Result<Self> {
        let url = overrides
            .url
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("no server url given".to_string()))?;
        let mut config = Config {
            server: ServerConfig::new(url)?,
            polling: PollPolicy::default(),
            verdicts: VerdictPolicies::default(),
            retry: RetryPolicy::default(),
        };
        config.apply(overrides)?;
        Ok(config)
    }

    /// Replace file values with the ones given on the command line.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(url) = &overrides.url {
            self.server.url = server::validate_url(url).map_err(Error::InvalidConfig)?;
        }
        if let Some(user) = &overrides.user {
            self.server.user = Some(user.clone());
        }
        if let Some(password) = &overrides.password {
            self.server.password = Some(EnvValue::Literal(password.clone()));
        }
        Ok(())
    }

    pub fn wait_options(&self, cancel: CancellationToken) -> WaitOptions {
        WaitOptions::new(self.polling, cancel)
    }

    pub fn template() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                user: Some("ADMIN".to_string()),
                password: Some(EnvValue::FromEnv {
                    var: "DNGCM_PASSWORD".to_string(),
                    default: None,
                }),
                ..ServerConfig::new(TEMPLATE_URL)?
            },
            polling: PollPolicy::default(),
            verdicts: VerdictPolicies::default(),
            retry: RetryPolicy::default(),
        })
    }
}
