// ABOUTME: Type system import from a source configuration into a target changeset or stream.
// ABOUTME: Posts a TypeImportSession in the target's context and tracks it to a verdict.

use crate::oslc::Description;
use crate::oslc::vocab::{header, media, prop};
use crate::resources::{Configuration, FactoryLookup, ResourceError};
use crate::tracker::{self, Completion, TrackerError, VerdictPolicy, WaitOptions};
use crate::transport::{Request, Transport, TransportError};
use crate::types::TrackerUri;

/// Errors importing a type system.
#[derive(Debug, thiserror::Error)]
pub enum TypeImportError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("target configuration {0} names no service provider")]
    NoServiceProvider(String),

    #[error("type import factory {factory} answered {status}, expected 202")]
    UnexpectedStatus { factory: String, status: u16 },

    #[error("type import factory {factory} answered 202 without a tracker location")]
    MissingLocation { factory: String },
}

/// RDF/XML body of a `types:TypeImportSession`.
fn session_payload(source: &Configuration, target: &Configuration, provider: &str) -> String {
    Description::new("types:TypeImportSession")
        .resource("types:source", source.uri.as_str())
        .resource("types:target", target.uri.as_str())
        .resource("oslc:serviceProvider", provider)
        .to_xml()
}

/// Import the type system of `source` into `target`.
///
/// The session is created through the target's `TypeImportSession` factory
/// in the target's configuration context, then its tracker is followed until
/// `policy` accepts or rejects the verdict.
pub async fn perform_type_import<T, L>(
    transport: &T,
    lookup: &L,
    source: &Configuration,
    target: &Configuration,
    wait: &WaitOptions,
    policy: VerdictPolicy,
) -> Result<Completion, TypeImportError>
where
    T: Transport + ?Sized,
    L: FactoryLookup + ?Sized,
{
    let provider = target
        .service_provider
        .as_ref()
        .ok_or_else(|| TypeImportError::NoServiceProvider(target.uri.to_string()))?;
    let factory = lookup
        .creation_factory(provider, prop::TYPES_TYPE_IMPORT_SESSION)
        .await?;

    let request = Request::post(factory.as_str())
        .configuration_context(target.uri.as_str())
        .without_header(header::OSLC_CORE_VERSION)
        .accept(media::RDF_XML)
        .rdf_xml(session_payload(source, target, provider.as_str()));
    let response = transport.send(request).await?;
    tracing::debug!(factory = %factory, status = response.status, "type import session posted");

    if response.status != 202 {
        return Err(TypeImportError::UnexpectedStatus {
            factory: factory.to_string(),
            status: response.status,
        });
    }
    let location = response
        .location()
        .ok_or_else(|| TypeImportError::MissingLocation {
            factory: factory.to_string(),
        })?;

    let completion = tracker::track(transport, TrackerUri::new(location), wait, policy).await?;
    tracing::info!(
        source = %source.label(),
        target = %target.label(),
        verdict = %completion.verdict,
        "type system imported"
    );
    Ok(completion)
}
