// ABOUTME: Phantom-typed resource URIs for compile-time type safety.
// ABOUTME: Prevents passing a tracker URI where a configuration URI is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
pub enum ConfigurationMarker {}
pub enum ComponentMarker {}
pub enum TrackerMarker {}
pub enum DeliverySessionMarker {}
pub enum ServiceProviderMarker {}
pub enum CreationFactoryMarker {}

/// An absolute resource URI tagged with the kind of resource it names.
///
/// The server hands out plain strings for everything. Tagging them keeps a
/// `TrackerUri` from being posted to as if it were a `CreationFactoryUri`.
#[must_use = "URIs reference server resources and should not be ignored"]
pub struct Uri<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Uri<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// The URI percent-encoded for use as a query parameter value.
    pub fn encoded(&self) -> Cow<'_, str> {
        urlencoding::encode(&self.value)
    }
}

impl<T> std::fmt::Debug for Uri<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Uri").field(&self.value).finish()
    }
}

impl<T> Clone for Uri<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Uri<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Uri<T> {}

impl<T> Hash for Uri<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Uri<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Serialize for Uri<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Uri<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type ConfigurationUri = Uri<ConfigurationMarker>;
pub type ComponentUri = Uri<ComponentMarker>;
pub type TrackerUri = Uri<TrackerMarker>;
pub type DeliverySessionUri = Uri<DeliverySessionMarker>;
pub type ServiceProviderUri = Uri<ServiceProviderMarker>;
pub type CreationFactoryUri = Uri<CreationFactoryMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_escapes_reserved_characters() {
        let uri = ConfigurationUri::new("https://clm.example.com/rm/cm/stream/_a1?x=1");
        assert_eq!(
            uri.encoded(),
            "https%3A%2F%2Fclm.example.com%2Frm%2Fcm%2Fstream%2F_a1%3Fx%3D1"
        );
    }

    #[test]
    fn deserializes_from_plain_string() {
        let uri: TrackerUri = serde_json::from_str("\"https://h/rm/tracker/1\"").unwrap();
        assert_eq!(uri.as_str(), "https://h/rm/tracker/1");
    }
}
