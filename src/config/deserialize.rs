// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates server URLs and polling settings while the file is parsed.

use reqwest::Url;
use serde::Deserialize;

use super::server::validate_url;
use crate::tracker::PollPolicy;

pub fn deserialize_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    validate_url(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_poll_policy<'de, D>(deserializer: D) -> Result<PollPolicy, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let policy = PollPolicy::deserialize(deserializer)?;
    policy.validate().map_err(serde::de::Error::custom)?;
    Ok(policy)
}
