// ABOUTME: Read-only access to configuration-management resources on the server.
// ABOUTME: Fetches configurations and components, and looks up creation factories.

mod component;
mod configuration;
mod lookup;

pub use component::{Component, component_configurations, fetch_component};
pub use configuration::{Configuration, fetch_configuration};
pub use lookup::{FactoryLookup, ServiceProviderLookup};

use crate::oslc::vocab::media;
use crate::oslc::{Graph, GraphError};
use crate::transport::{Request, Transport, TransportError};

/// Errors reading resources.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected status {status} reading {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("invalid RDF from {url}: {source}")]
    Rdf {
        url: String,
        #[source]
        source: GraphError,
    },

    #[error("{url} does not describe a {what}")]
    NotDescribed { url: String, what: &'static str },

    #[error("no creation factory for {resource_type} in {service_provider}")]
    NoCreationFactory {
        service_provider: String,
        resource_type: String,
    },
}

/// GET an RDF document. 404 and 410 mean the resource is gone and yield `None`.
pub(crate) async fn read_graph<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
) -> Result<Option<Graph>, ResourceError> {
    let response = transport
        .send(Request::get(url).oslc().accept(media::RDF_XML))
        .await?;
    match response.status {
        200 => Graph::parse(response.content_type(), &response.body)
            .map(Some)
            .map_err(|source| ResourceError::Rdf {
                url: url.to_string(),
                source,
            }),
        404 | 410 => {
            tracing::debug!(url, status = response.status, "resource not found");
            Ok(None)
        }
        status => Err(ResourceError::UnexpectedStatus {
            url: url.to_string(),
            status,
        }),
    }
}
