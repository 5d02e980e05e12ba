// ABOUTME: Type-safe resource URIs and configuration classification.
// ABOUTME: Uses phantom types to keep different resource URIs apart at compile time.

mod kind;
mod uri;

pub use kind::{ConfigurationKind, classify};
pub use uri::{
    ComponentUri, ConfigurationUri, CreationFactoryUri, DeliverySessionUri, ServiceProviderUri,
    TrackerUri, Uri,
};

/// Wall-clock stamp used in generated titles, e.g. `2024/03/01 10:15:00 UTC`.
pub fn timestamp() -> String {
    chrono::Utc::now().format("%Y/%m/%d %H:%M:%S UTC").to_string()
}
