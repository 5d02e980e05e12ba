// ABOUTME: Local-versioning endpoints behind the dependency gate and archiver traits.
// ABOUTME: Every outcome, including transport failure, comes back as a CallStatus value.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use super::{CallStatus, ConfigurationArchiver, DependencyGate};
use crate::oslc::vocab::{internal, media};
use crate::transport::{Request, Response, Transport};
use crate::types::ConfigurationUri;

/// Dependency and archive calls through the server's unsupported local-versioning API.
pub struct LocalVersioningApi<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> LocalVersioningApi<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    fn endpoint(&self, path: &str, configuration: &ConfigurationUri) -> String {
        format!(
            "{}{}{}",
            self.transport.base_url(),
            path,
            configuration.encoded()
        )
    }

    async fn call(&self, request: Request) -> Result<Response, CallStatus> {
        let url = request.url.clone();
        match self.transport.send(request).await {
            Ok(response) if response.status == 200 => Ok(response),
            Ok(response) => {
                tracing::debug!(url, status = response.status, "local versioning call failed");
                Err(CallStatus::failed(format!(
                    "Unexpected return code '{}'.",
                    response.status
                )))
            }
            Err(e) => Err(CallStatus::failed(format!("Exception {e}"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependentPage {
    total_number_of_results: u32,
}

#[derive(Deserialize)]
struct ArchivedFlag {
    archived: bool,
}

#[async_trait]
impl<T: Transport + ?Sized> DependencyGate for LocalVersioningApi<'_, T> {
    async fn has_no_dependents(&self, configuration: &ConfigurationUri) -> CallStatus {
        let url = self.endpoint(internal::DEPENDENT_CONFIGURATIONS, configuration);
        let response = match self.call(Request::get(url).accept(media::JSON)).await {
            Ok(response) => response,
            Err(status) => return status,
        };
        if response.body.is_empty() {
            return CallStatus::failed("No data returned");
        }

        let pages: HashMap<String, DependentPage> = match response.json() {
            Ok(pages) => pages,
            Err(e) => return CallStatus::failed(format!("Exception {e}")),
        };
        match pages.get(configuration.as_str()) {
            Some(page) => {
                let count = page.total_number_of_results;
                tracing::debug!(%configuration, count, "dependent configurations");
                CallStatus::answered(count == 0, Some(count), "")
            }
            None => CallStatus::failed(format!(
                "Response does not describe '{configuration}'."
            )),
        }
    }
}

#[async_trait]
impl<T: Transport + ?Sized> ConfigurationArchiver for LocalVersioningApi<'_, T> {
    async fn archive_with_descendants(&self, configuration: &ConfigurationUri) -> CallStatus {
        let url = self.endpoint(internal::ARCHIVE_WITH_DESCENDANTS, configuration);
        match self.call(Request::post(url).accept(media::ANY)).await {
            Ok(_) => CallStatus::answered(true, None, ""),
            Err(status) => status,
        }
    }

    async fn is_archived(&self, configuration: &ConfigurationUri) -> CallStatus {
        let url = self.endpoint(internal::IS_ARCHIVED, configuration);
        let response = match self.call(Request::get(url).accept(media::JSON)).await {
            Ok(response) => response,
            Err(status) => return status,
        };
        match response.json::<ArchivedFlag>() {
            Ok(ArchivedFlag { archived: true }) => {
                CallStatus::answered(true, None, "Configuration is archived")
            }
            Ok(ArchivedFlag { archived: false }) => CallStatus::answered(false, None, ""),
            Err(e) => CallStatus::failed(format!("Exception {e}")),
        }
    }
}
