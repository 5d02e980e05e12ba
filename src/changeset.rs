// ABOUTME: Changeset lifecycle against a stream: create through the stream's factory, discard.
// ABOUTME: Creation is asynchronous; the tracker's reference names the new changeset.

use crate::oslc::Description;
use crate::oslc::vocab::{internal, media, prop};
use crate::resources::{Configuration, ResourceError};
use crate::tracker::{self, TrackerError, VerdictPolicy, WaitOptions};
use crate::transport::{Request, Transport, TransportError};
use crate::types::{ConfigurationUri, TrackerUri, timestamp};

/// Errors creating or discarding a changeset.
#[derive(Debug, thiserror::Error)]
pub enum ChangesetError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("configuration {uri} has no {what}")]
    Missing { uri: String, what: &'static str },

    #[error("changeset factory {factory} answered {status}, expected 202 with a tracker")]
    NotAccepted { factory: String, status: u16 },

    #[error("changeset creation tracked by {tracker} completed without naming the changeset")]
    NoReference { tracker: String },

    #[error("discarding changeset {changeset} failed with status {status}")]
    DiscardFailed { changeset: String, status: u16 },
}

/// Title and description of a new changeset.
#[derive(Debug, Clone)]
pub struct ChangesetRequest {
    pub title: String,
    pub description: String,
}

impl Default for ChangesetRequest {
    fn default() -> Self {
        let host = gethostname::gethostname().to_string_lossy().into_owned();
        Self {
            title: format!("Import-Type-System-CS-{}", timestamp()),
            description: format!("Created for automation on {host}."),
        }
    }
}

impl ChangesetRequest {
    fn to_rdf_xml(&self, component: &str, stream: &str) -> String {
        Description::new("oslc_config:Configuration")
            .about(prop::CONFIG_CHANGESET)
            .literal("dcterms:title", &self.title)
            .literal("dcterms:description", &self.description)
            .resource("oslc_config:component", component)
            .resource("oslc_config:stream", stream)
            .to_xml()
    }
}

/// Create a changeset against `stream` and return its URI.
///
/// The stream must name its component and its changesets factory. The
/// creation tracker has to finish with a verdict `policy` accepts and must
/// reference the new changeset.
pub async fn create_changeset<T: Transport + ?Sized>(
    transport: &T,
    stream: &Configuration,
    request: &ChangesetRequest,
    wait: &WaitOptions,
    policy: VerdictPolicy,
) -> Result<ConfigurationUri, ChangesetError> {
    let missing = |what| ChangesetError::Missing {
        uri: stream.uri.to_string(),
        what,
    };
    let component = stream.component.as_ref().ok_or_else(|| missing("component"))?;
    let factory = stream
        .changesets
        .as_ref()
        .ok_or_else(|| missing("changesets factory"))?;

    tracing::debug!(factory = %factory, title = %request.title, "creating changeset");
    let http = Request::post(factory.as_str())
        .oslc()
        .accept(media::RDF_XML)
        .rdf_xml(request.to_rdf_xml(component.as_str(), stream.uri.as_str()));
    let response = transport.send(http).await?;

    let location = match (response.status, response.location()) {
        (202, Some(location)) => location.to_string(),
        (status, _) => {
            return Err(ChangesetError::NotAccepted {
                factory: factory.to_string(),
                status,
            });
        }
    };

    let tracker = TrackerUri::new(location);
    let completion = tracker::track(transport, tracker.clone(), wait, policy).await?;
    let changeset = completion
        .reference
        .map(ConfigurationUri::new)
        .ok_or_else(|| ChangesetError::NoReference {
            tracker: tracker.to_string(),
        })?;
    tracing::info!(%changeset, stream = %stream.label(), "changeset created");
    Ok(changeset)
}

/// Discard `changeset`, evaluated in the context of the stream it overrides.
///
/// Succeeds only on `200` with a body ending in `OK`.
pub async fn discard_changeset<T: Transport + ?Sized>(
    transport: &T,
    changeset: &ConfigurationUri,
    stream: &ConfigurationUri,
) -> Result<(), ChangesetError> {
    let url = format!("{}{}", transport.base_url(), internal::DISCARD_CHANGESET);
    let body = serde_json::json!({ "configurationId": changeset.as_str() }).to_string();
    let http = Request::post(url)
        .content_type(media::TEXT)
        .accept(media::ANY)
        .configuration_context(stream.as_str())
        .body(body);
    let response = transport.send(http).await?;

    if response.status == 200 && response.text().trim_end().ends_with("OK") {
        tracing::info!(%changeset, "changeset discarded");
        return Ok(());
    }
    Err(ChangesetError::DiscardFailed {
        changeset: changeset.to_string(),
        status: response.status,
    })
}

/// Discard a changeset read from the server, using the stream it overrides as context.
pub async fn discard<T: Transport + ?Sized>(
    transport: &T,
    changeset: &Configuration,
) -> Result<(), ChangesetError> {
    let stream = changeset
        .overrides
        .as_ref()
        .ok_or_else(|| ChangesetError::Missing {
            uri: changeset.uri.to_string(),
            what: "overridden stream",
        })?;
    discard_changeset(transport, &changeset.uri, stream).await
}
