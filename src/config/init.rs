// ABOUTME: Config scaffolding for new working directories.
// ABOUTME: Creates a commented dngcm.yml template.

use std::path::Path;

use crate::error::{Error, Result};

use super::server::validate_url;
use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, url: Option<&str>, user: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template()?;

    if let Some(u) = url {
        config.server.url = validate_url(u).map_err(Error::InvalidConfig)?;
    }

    if let Some(u) = user {
        config.server.user = Some(u.to_string());
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"server:
  url: {}
  user: {}
  # Literal string or a reference to an environment variable
  password: {{ env: DNGCM_PASSWORD }}
  accept_invalid_certs: false
  request_timeout: 60s

# Tracker polling: delay grows by `backoff` up to `max_interval`
polling:
  interval: 2s
  max_interval: 30s
  backoff: 1.5
  timeout: 30m

# strict | reject-failures | reject-errors
verdicts:
  delivery: strict
  type_import: reject-errors
  changeset: strict

# Extra attempts for failed GET requests
retry:
  attempts: 0
  delay: 1s
"#,
        config.server.base_url(),
        config.server.user.as_deref().unwrap_or("ADMIN"),
    )
}
