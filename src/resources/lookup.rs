// ABOUTME: Creation-factory discovery from an OSLC service provider document.
// ABOUTME: Trait seam so callers can resolve factories without a catalog walk.

use async_trait::async_trait;

use super::{ResourceError, read_graph};
use crate::oslc::vocab::prop;
use crate::transport::Transport;
use crate::types::{CreationFactoryUri, ServiceProviderUri};

/// Resolves the creation factory for a resource type within a service provider.
#[async_trait]
pub trait FactoryLookup: Send + Sync {
    async fn creation_factory(
        &self,
        service_provider: &ServiceProviderUri,
        resource_type: &str,
    ) -> Result<CreationFactoryUri, ResourceError>;
}

/// Reads the service provider document through a transport.
pub struct ServiceProviderLookup<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> ServiceProviderLookup<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport + ?Sized> FactoryLookup for ServiceProviderLookup<'_, T> {
    async fn creation_factory(
        &self,
        service_provider: &ServiceProviderUri,
        resource_type: &str,
    ) -> Result<CreationFactoryUri, ResourceError> {
        let not_found = || ResourceError::NoCreationFactory {
            service_provider: service_provider.to_string(),
            resource_type: resource_type.to_string(),
        };

        let graph = read_graph(self.transport, service_provider.as_str())
            .await?
            .ok_or_else(not_found)?;

        let creation = graph
            .resources_of_type(prop::OSLC_CREATION_FACTORY)
            .filter(|factory| {
                factory
                    .uris(prop::OSLC_RESOURCE_TYPE)
                    .contains(&resource_type)
            })
            .find_map(|factory| factory.first_uri(prop::OSLC_CREATION))
            .ok_or_else(not_found)?;

        tracing::debug!(resource_type, creation, "resolved creation factory");
        Ok(CreationFactoryUri::new(creation))
    }
}
