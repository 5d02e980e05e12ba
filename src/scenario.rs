// ABOUTME: Expensive-scenario bracketing so server admins can attribute load to a run.
// ABOUTME: Start and stop are best-effort; failures only produce warnings.

use serde::Deserialize;

use crate::diagnostics::{Diagnostics, Warning};
use crate::oslc::vocab::{header, internal, media};
use crate::transport::{Request, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected response code '{0}'")]
    UnexpectedStatus(u16),

    #[error("unexpected response body '{0}'")]
    UnexpectedBody(String),
}

/// Server acknowledgement of a started scenario. Stopping posts it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioHandle {
    raw: String,
    instance_id: Option<String>,
}

impl ScenarioHandle {
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    scenario_name: Option<String>,
    scenario_instance_id: Option<String>,
}

pub struct ExpensiveScenario<'a, T: ?Sized> {
    transport: &'a T,
    name: String,
}

impl<'a, T: Transport + ?Sized> ExpensiveScenario<'a, T> {
    pub fn new(transport: &'a T, name: impl Into<String>) -> Self {
        Self {
            transport,
            name: name.into(),
        }
    }

    /// Scenario named `dngcm_<version>_<command>`.
    pub fn for_command(transport: &'a T, command: &str) -> Self {
        Self::new(
            transport,
            format!("dngcm_{}_{command}", env!("CARGO_PKG_VERSION")),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, action: &str, body: String) -> Request {
        let url = format!("{}{}/{action}", self.transport.base_url(), internal::SCENARIO_SERVICE);
        Request::post(url)
            .without_header(header::OSLC_CORE_VERSION)
            .content_type(media::JSON)
            .accept(media::JSON)
            .body(body)
    }

    pub async fn start(&self) -> Result<ScenarioHandle, ScenarioError> {
        let body = serde_json::json!({ "scenarioName": self.name }).to_string();
        tracing::debug!(scenario = %self.name, "starting scenario");
        let response = self.transport.send(self.request("startscenario", body)).await?;
        if response.status != 200 {
            return Err(ScenarioError::UnexpectedStatus(response.status));
        }

        let raw = response.text().into_owned();
        match serde_json::from_str::<StartResponse>(&raw) {
            Ok(parsed) if parsed.scenario_name.as_deref() == Some(self.name.as_str()) => {
                Ok(ScenarioHandle {
                    instance_id: parsed.scenario_instance_id,
                    raw,
                })
            }
            _ => Err(ScenarioError::UnexpectedBody(raw)),
        }
    }

    /// Stop a started scenario. The server echoes the instance id on success.
    pub async fn stop(&self, handle: &ScenarioHandle) -> Result<(), ScenarioError> {
        tracing::debug!(scenario = %self.name, "stopping scenario");
        let response = self
            .transport
            .send(self.request("stopscenario", handle.raw.clone()))
            .await?;
        if response.status != 200 {
            return Err(ScenarioError::UnexpectedStatus(response.status));
        }

        let body = response.text();
        let echoed = body.trim().trim_matches('"');
        match handle.instance_id() {
            Some(id) if id == echoed => Ok(()),
            _ => Err(ScenarioError::UnexpectedBody(body.into_owned())),
        }
    }

    pub async fn start_or_warn(&self, diag: &mut Diagnostics) -> Option<ScenarioHandle> {
        match self.start().await {
            Ok(handle) => Some(handle),
            Err(e) => {
                diag.warn(Warning::scenario(format!(
                    "scenario {} can not be started: {e}",
                    self.name
                )));
                None
            }
        }
    }

    pub async fn stop_or_warn(&self, handle: &ScenarioHandle, diag: &mut Diagnostics) {
        if let Err(e) = self.stop(handle).await {
            diag.warn(Warning::scenario(format!(
                "scenario {} can not be stopped: {e}",
                self.name
            )));
        }
    }
}
