// ABOUTME: YAML worklists consumed by the batch commands.
// ABOUTME: A worklist must name at least one item; import worklists can be built from stream tags.

use nonempty::NonEmpty;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::resources::Configuration;
use crate::types::{ConfigurationKind, ConfigurationUri};

/// Move types from `source` into `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    pub source: ConfigurationUri,
    pub target: ConfigurationUri,
    /// Free-text label shown in progress output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// A configuration to archive. Accepts a bare URI or `{ configuration: <uri> }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ArchiveEntry")]
pub struct ArchiveItem {
    pub configuration: ConfigurationUri,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArchiveEntry {
    Simple(ConfigurationUri),
    Detailed { configuration: ConfigurationUri },
}

impl From<ArchiveEntry> for ArchiveItem {
    fn from(entry: ArchiveEntry) -> Self {
        match entry {
            ArchiveEntry::Simple(configuration) | ArchiveEntry::Detailed { configuration } => {
                ArchiveItem { configuration }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Worklist<T> {
    pub items: NonEmpty<T>,
}

#[derive(Deserialize)]
struct Document<T> {
    items: Vec<T>,
}

impl<T: DeserializeOwned> Worklist<T> {
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, String> {
        let document: Document<T> = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
        NonEmpty::from_vec(document.items)
            .map(|items| Worklist { items })
            .ok_or_else(|| "worklist has no items".to_string())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|message| Error::InvalidWorklist {
            path: path.to_path_buf(),
            message,
        })
    }
}

impl<T: Serialize> Worklist<T> {
    pub fn to_yaml(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Items<'a, T> {
            items: Vec<&'a T>,
        }
        let items = Items {
            items: self.items.iter().collect(),
        };
        Ok(serde_yaml::to_string(&items)?)
    }
}

impl<T> Worklist<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Pair the single stream whose description contains `source_tag` with
/// every other stream whose description contains `target_tag`.
pub fn tagged_transfers(
    configurations: &[Configuration],
    source_tag: &str,
    target_tag: &str,
) -> Result<Worklist<TransferItem>> {
    fn tagged<'c>(
        configurations: &'c [Configuration],
        tag: &'c str,
    ) -> impl Iterator<Item = &'c Configuration> + 'c {
        configurations.iter().filter(move |c| {
            c.kind == ConfigurationKind::Stream
                && c.description.as_deref().is_some_and(|d| d.contains(tag))
        })
    }

    let sources: Vec<&Configuration> = tagged(configurations, source_tag).collect();
    let source = match sources.as_slice() {
        [source] => *source,
        [] => return Err(Error::NoSource(source_tag.to_string())),
        _ => {
            return Err(Error::AmbiguousSource {
                tag: source_tag.to_string(),
                count: sources.len(),
            });
        }
    };

    let targets = tagged(configurations, target_tag)
        .filter(|c| c.uri != source.uri)
        .map(|target| TransferItem {
            source: source.uri.clone(),
            target: target.uri.clone(),
            project: target.title.clone(),
        })
        .collect();
    NonEmpty::from_vec(targets)
        .map(|items| Worklist { items })
        .ok_or_else(|| Error::NoTargets(target_tag.to_string()))
}
