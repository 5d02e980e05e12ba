// ABOUTME: Configuration resource (stream, baseline or changeset) read from the server.
// ABOUTME: Kind is classified once from the URI when the value is built.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ResourceError, read_graph};
use crate::oslc::Graph;
use crate::oslc::vocab::prop;
use crate::transport::Transport;
use crate::types::{
    ComponentUri, ConfigurationKind, ConfigurationUri, CreationFactoryUri, ServiceProviderUri,
    classify,
};

/// A configuration as described by the server at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct Configuration {
    pub uri: ConfigurationUri,
    pub kind: ConfigurationKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub identifier: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub creator: Option<String>,
    pub component: Option<ComponentUri>,
    pub service_provider: Option<ServiceProviderUri>,
    pub project_area: Option<String>,
    /// The stream a changeset modifies.
    pub overrides: Option<ConfigurationUri>,
    pub previous_baseline: Option<ConfigurationUri>,
    pub was_derived_from: Option<ConfigurationUri>,
    /// Factory for changesets against this stream.
    pub changesets: Option<CreationFactoryUri>,
}

impl Configuration {
    /// A configuration known only by its URI.
    pub fn new(uri: ConfigurationUri) -> Self {
        Self {
            kind: classify(uri.as_str()),
            uri,
            title: None,
            description: None,
            identifier: None,
            created: None,
            creator: None,
            component: None,
            service_provider: None,
            project_area: None,
            overrides: None,
            previous_baseline: None,
            was_derived_from: None,
            changesets: None,
        }
    }

    /// Build from a graph describing `uri`. Returns `None` if the graph does not describe it.
    pub fn from_graph(uri: &str, graph: &Graph) -> Option<Self> {
        let resource = graph.subject_or_only(uri)?;
        let text = |p: &str| resource.first_text(p);
        let link = |p: &str| resource.first_uri(p).map(str::to_string);

        Some(Self {
            uri: ConfigurationUri::new(uri),
            kind: classify(uri),
            title: text(prop::DC_TITLE),
            description: text(prop::DC_DESCRIPTION),
            identifier: text(prop::DC_IDENTIFIER),
            created: resource
                .first_value(prop::DC_CREATED)
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|t| t.with_timezone(&Utc)),
            creator: resource
                .first(prop::DC_CREATOR)
                .map(|t| t.value.clone()),
            component: link(prop::CONFIG_COMPONENT).map(ComponentUri::new),
            service_provider: link(prop::OSLC_SERVICE_PROVIDER).map(ServiceProviderUri::new),
            project_area: link(prop::PROCESS_PROJECT_AREA),
            overrides: link(prop::CONFIG_OVERRIDES).map(ConfigurationUri::new),
            previous_baseline: link(prop::CONFIG_PREVIOUS_BASELINE).map(ConfigurationUri::new),
            was_derived_from: link(prop::PROV_WAS_DERIVED_FROM).map(ConfigurationUri::new),
            changesets: link(prop::DNG_CHANGESETS).map(CreationFactoryUri::new),
        })
    }

    /// Title for log lines, falling back to the URI.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.uri.as_str())
    }
}

/// Read a configuration. `Ok(None)` when the server reports it missing or gone.
pub async fn fetch_configuration<T: Transport + ?Sized>(
    transport: &T,
    uri: &ConfigurationUri,
) -> Result<Option<Configuration>, ResourceError> {
    let Some(graph) = read_graph(transport, uri.as_str()).await? else {
        return Ok(None);
    };
    Configuration::from_graph(uri.as_str(), &graph)
        .map(Some)
        .ok_or_else(|| ResourceError::NotDescribed {
            url: uri.to_string(),
            what: "configuration",
        })
}
