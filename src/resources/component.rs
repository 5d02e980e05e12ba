// ABOUTME: Component resource and enumeration of its configurations.
// ABOUTME: The configurations container lists members via rdfs:member.

use serde::Serialize;

use super::{Configuration, ResourceError, fetch_configuration, read_graph};
use crate::oslc::Graph;
use crate::oslc::vocab::prop;
use crate::transport::Transport;
use crate::types::{ComponentUri, ConfigurationUri};

/// A component owning streams, baselines and changesets.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub uri: ComponentUri,
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_area: Option<String>,
    /// Container listing the component's configurations.
    pub configurations: Option<String>,
}

impl Component {
    pub fn from_graph(uri: &str, graph: &Graph) -> Option<Self> {
        let resource = graph.subject_or_only(uri)?;
        Some(Self {
            uri: ComponentUri::new(uri),
            title: resource.first_text(prop::DC_TITLE),
            description: resource.first_text(prop::DC_DESCRIPTION),
            project_area: resource
                .first_uri(prop::PROCESS_PROJECT_AREA)
                .map(str::to_string),
            configurations: resource
                .first_uri(prop::CONFIG_CONFIGURATIONS)
                .map(str::to_string),
        })
    }

    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.uri.as_str())
    }
}

pub async fn fetch_component<T: Transport + ?Sized>(
    transport: &T,
    uri: &ComponentUri,
) -> Result<Option<Component>, ResourceError> {
    let Some(graph) = read_graph(transport, uri.as_str()).await? else {
        return Ok(None);
    };
    Component::from_graph(uri.as_str(), &graph)
        .map(Some)
        .ok_or_else(|| ResourceError::NotDescribed {
            url: uri.to_string(),
            what: "component",
        })
}

/// Fetch every configuration listed in the component's configurations container.
///
/// Members the server no longer returns are skipped.
pub async fn component_configurations<T: Transport + ?Sized>(
    transport: &T,
    component: &Component,
) -> Result<Vec<Configuration>, ResourceError> {
    let Some(container) = component.configurations.as_deref() else {
        return Ok(Vec::new());
    };
    let Some(graph) = read_graph(transport, container).await? else {
        tracing::warn!(container, "configurations container not found");
        return Ok(Vec::new());
    };

    let mut members: Vec<&str> = graph
        .resources()
        .flat_map(|r| r.uris(prop::RDFS_MEMBER))
        .collect();
    members.dedup();

    let mut configurations = Vec::with_capacity(members.len());
    for member in members {
        match fetch_configuration(transport, &ConfigurationUri::new(member)).await? {
            Some(configuration) => configurations.push(configuration),
            None => tracing::debug!(member, "listed configuration is gone"),
        }
    }
    Ok(configurations)
}
