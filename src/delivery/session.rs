// ABOUTME: Delivery session struct parameterized by its state marker.
// ABOUTME: Holds the session URI and the source/target pair it was created for.

use super::state::{Committing, Ready, SessionState};
use crate::oslc::Description;
use crate::types::{
    ConfigurationUri, DeliverySessionUri, ServiceProviderUri, TrackerUri, timestamp,
};

/// What a delivery session moves: the types of `source` into `target`.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub source: ConfigurationUri,
    pub target: ConfigurationUri,
    /// Service provider that owns the delivery session factory.
    pub service_provider: ServiceProviderUri,
    /// Service provider of the target, recorded on the session.
    pub target_service_provider: ServiceProviderUri,
    pub title: String,
}

impl DeliveryRequest {
    /// Request with the default timestamped title.
    pub fn new(
        source: ConfigurationUri,
        target: ConfigurationUri,
        service_provider: ServiceProviderUri,
        target_service_provider: ServiceProviderUri,
    ) -> Self {
        Self {
            source,
            target,
            service_provider,
            target_service_provider,
            title: format!("Type System Delivery Session {}", timestamp()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// RDF/XML document for this session, optionally addressed and with a state.
    pub(crate) fn to_rdf_xml(&self, about: Option<&str>, state: Option<&str>) -> String {
        let mut description = Description::new("dng_config:DeliverySession")
            .literal("dcterms:title", &self.title)
            .resource("types:source", self.source.as_str())
            .resource("types:target", self.target.as_str())
            .resource(
                "oslc:serviceProvider",
                self.target_service_provider.as_str(),
            );
        if let Some(about) = about {
            description = description.about(about);
        }
        if let Some(state) = state {
            description = description.resource("dng_config:deliverySessionState", state);
        }
        description.to_xml()
    }
}

/// A delivery session on the server, parameterized by its current state.
///
/// Transitions consume the session. Failing transitions hand it back together
/// with the error so the caller can still delete it.
#[derive(Debug)]
#[must_use = "an undelivered session should be committed or discarded"]
pub struct DeliverySession<S> {
    pub(crate) uri: DeliverySessionUri,
    pub(crate) request: DeliveryRequest,
    pub(crate) state: S,
}

impl<S> DeliverySession<S> {
    pub fn uri(&self) -> &DeliverySessionUri {
        &self.uri
    }

    pub fn request(&self) -> &DeliveryRequest {
        &self.request
    }

    pub(crate) fn transition<T>(self, state: T) -> DeliverySession<T> {
        DeliverySession {
            uri: self.uri,
            request: self.request,
            state,
        }
    }
}

impl DeliverySession<Ready> {
    /// Server-side state read before commit.
    pub fn session_state(&self) -> &SessionState {
        &self.state.state
    }
}

impl DeliverySession<Committing> {
    pub fn tracker(&self) -> &TrackerUri {
        &self.state.tracker
    }
}
