// ABOUTME: Top-level type-system workflows composed from changesets, type import and delivery.
// ABOUTME: Failed steps after changeset creation discard the changeset before reporting.

use serde::Serialize;

use crate::changeset::{self, ChangesetError, ChangesetRequest};
use crate::config::VerdictPolicies;
use crate::delivery::{DeliveryError, DeliveryOutcome, DeliveryRequest, perform_delivery};
use crate::diagnostics::{Diagnostics, Warning};
use crate::resources::{Configuration, ResourceError, ServiceProviderLookup, fetch_configuration};
use crate::tracker::WaitOptions;
use crate::transport::Transport;
use crate::type_import::{TypeImportError, perform_type_import};
use crate::types::{ConfigurationUri, ServiceProviderUri};
use crate::worklist::TransferItem;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("{what} {uri} not found")]
    NotFound { what: &'static str, uri: String },

    #[error("configuration {0} names no service provider")]
    NoServiceProvider(String),

    #[error("changeset: {0}")]
    Changeset(#[from] ChangesetError),

    #[error("type import: {0}")]
    TypeImport(#[from] TypeImportError),

    #[error("delivery: {0}")]
    Delivery(#[from] DeliveryError),
}

impl WorkflowError {
    pub fn is_cancelled(&self) -> bool {
        use crate::tracker::TrackerError;
        let tracker_cancelled = |e: &TrackerError| matches!(e, TrackerError::Cancelled { .. });
        match self {
            WorkflowError::Delivery(DeliveryError::Cancelled) => true,
            WorkflowError::Delivery(DeliveryError::Tracker(e))
            | WorkflowError::TypeImport(TypeImportError::Tracker(e))
            | WorkflowError::Changeset(ChangesetError::Tracker(e)) => tracker_cancelled(e),
            _ => false,
        }
    }
}

/// Result of a successful import-and-deliver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub changeset: ConfigurationUri,
    pub delivery: DeliveryOutcome,
}

/// Runs workflows against one server with fixed wait and verdict settings.
pub struct Automation<'a, T: ?Sized> {
    transport: &'a T,
    lookup: ServiceProviderLookup<'a, T>,
    wait: WaitOptions,
    verdicts: VerdictPolicies,
}

impl<'a, T: Transport + ?Sized> Automation<'a, T> {
    pub fn new(transport: &'a T, wait: WaitOptions, verdicts: VerdictPolicies) -> Self {
        Self {
            transport,
            lookup: ServiceProviderLookup::new(transport),
            wait,
            verdicts,
        }
    }

    pub fn wait(&self) -> &WaitOptions {
        &self.wait
    }

    async fn require(
        &self,
        what: &'static str,
        uri: &ConfigurationUri,
    ) -> Result<Configuration, WorkflowError> {
        fetch_configuration(self.transport, uri)
            .await?
            .ok_or_else(|| WorkflowError::NotFound {
                what,
                uri: uri.to_string(),
            })
    }

    /// Best-effort discard; a failure becomes a warning.
    async fn discard_changeset(
        &self,
        changeset: &ConfigurationUri,
        stream: &ConfigurationUri,
        diag: &mut Diagnostics,
    ) {
        tracing::info!(%changeset, "discarding changeset");
        if let Err(e) = changeset::discard_changeset(self.transport, changeset, stream).await {
            diag.warn(Warning::changeset_not_discarded(changeset.as_str(), e));
        }
    }

    /// Import the type system of `source` into a new changeset on `target`,
    /// then deliver the changeset into `target`.
    ///
    /// Any failure after the changeset exists discards it before the error
    /// is returned. A delivery that finds nothing to deliver also discards
    /// the changeset, so no open changeset is left behind on success.
    pub async fn import_and_deliver(
        &self,
        source: &ConfigurationUri,
        target: &ConfigurationUri,
        diag: &mut Diagnostics,
    ) -> Result<ImportOutcome, WorkflowError> {
        let source = self.require("source configuration", source).await?;
        let target = self.require("target configuration", target).await?;
        let target_provider = target
            .service_provider
            .clone()
            .ok_or_else(|| WorkflowError::NoServiceProvider(target.uri.to_string()))?;

        let changeset_uri = changeset::create_changeset(
            self.transport,
            &target,
            &ChangesetRequest::default(),
            &self.wait,
            self.verdicts.changeset,
        )
        .await?;

        let changeset = match self.require("changeset", &changeset_uri).await {
            Ok(changeset) => changeset,
            Err(e) => {
                self.discard_changeset(&changeset_uri, &target.uri, diag).await;
                return Err(e);
            }
        };
        let stream = changeset.overrides.clone().unwrap_or_else(|| target.uri.clone());

        tracing::info!(source = %source.label(), changeset = %changeset_uri, "importing type system");
        if let Err(e) = perform_type_import(
            self.transport,
            &self.lookup,
            &source,
            &changeset,
            &self.wait,
            self.verdicts.type_import,
        )
        .await
        {
            self.discard_changeset(&changeset_uri, &stream, diag).await;
            return Err(e.into());
        }

        let provider: ServiceProviderUri = changeset
            .service_provider
            .clone()
            .unwrap_or_else(|| target_provider.clone());
        let request = DeliveryRequest::new(
            changeset_uri.clone(),
            target.uri.clone(),
            provider,
            target_provider,
        );
        let delivery = match perform_delivery(
            self.transport,
            &self.lookup,
            request,
            &self.wait,
            self.verdicts.delivery,
            diag,
        )
        .await
        {
            Ok(delivery) => delivery,
            Err(e) => {
                self.discard_changeset(&changeset_uri, &stream, diag).await;
                return Err(e.into());
            }
        };

        if let DeliveryOutcome::NothingToDeliver(_) = delivery {
            self.discard_changeset(&changeset_uri, &stream, diag).await;
        }
        Ok(ImportOutcome {
            changeset: changeset_uri,
            delivery,
        })
    }

    /// Deliver `source` straight into `target` through the target's project area.
    pub async fn deliver(
        &self,
        source: &ConfigurationUri,
        target: &ConfigurationUri,
        diag: &mut Diagnostics,
    ) -> Result<DeliveryOutcome, WorkflowError> {
        let source = self.require("source configuration", source).await?;
        let target = self.require("target configuration", target).await?;
        let provider = target
            .service_provider
            .clone()
            .ok_or_else(|| WorkflowError::NoServiceProvider(target.uri.to_string()))?;

        let request = DeliveryRequest::new(source.uri, target.uri, provider.clone(), provider);
        let outcome = perform_delivery(
            self.transport,
            &self.lookup,
            request,
            &self.wait,
            self.verdicts.delivery,
            diag,
        )
        .await?;
        Ok(outcome)
    }

    /// Run `import_and_deliver` for every item, in order.
    pub async fn import_all<'i>(
        &self,
        items: impl IntoIterator<Item = &'i TransferItem>,
        diag: &mut Diagnostics,
        on_entry: impl FnMut(&TransferEntry),
    ) -> TransferReport {
        self.run_all(items, diag, on_entry, Mode::Import).await
    }

    /// Run `deliver` for every item, in order.
    pub async fn deliver_all<'i>(
        &self,
        items: impl IntoIterator<Item = &'i TransferItem>,
        diag: &mut Diagnostics,
        on_entry: impl FnMut(&TransferEntry),
    ) -> TransferReport {
        self.run_all(items, diag, on_entry, Mode::Deliver).await
    }

    async fn run_all<'i>(
        &self,
        items: impl IntoIterator<Item = &'i TransferItem>,
        diag: &mut Diagnostics,
        mut on_entry: impl FnMut(&TransferEntry),
        mode: Mode,
    ) -> TransferReport {
        let mut report = TransferReport::default();
        for item in items {
            let outcome = if self.wait.cancel.is_cancelled() {
                TransferOutcome::Cancelled
            } else {
                self.run_one(item, diag, mode).await
            };
            let entry = TransferEntry {
                source: item.source.to_string(),
                target: item.target.to_string(),
                project: item.project.clone(),
                outcome,
            };
            on_entry(&entry);
            report.entries.push(entry);
        }
        report
    }

    async fn run_one(&self, item: &TransferItem, diag: &mut Diagnostics, mode: Mode) -> TransferOutcome {
        tracing::info!(
            source = %item.source,
            target = %item.target,
            project = item.project.as_deref().unwrap_or(""),
            "transferring type system"
        );
        let result = match mode {
            Mode::Import => self
                .import_and_deliver(&item.source, &item.target, diag)
                .await
                .map(|o| (Some(o.changeset), o.delivery)),
            Mode::Deliver => self
                .deliver(&item.source, &item.target, diag)
                .await
                .map(|d| (None, d)),
        };
        match result {
            Ok((changeset, delivery)) => TransferOutcome::from_delivery(changeset, delivery),
            Err(e) if e.is_cancelled() => TransferOutcome::Cancelled,
            Err(e) => {
                tracing::error!(target_configuration = %item.target, error = %e, "transfer failed");
                TransferOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Import,
    Deliver,
}

/// Outcome of one worklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum TransferOutcome {
    Delivered {
        session: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        changeset: Option<String>,
    },
    NothingToDeliver {
        session: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        changeset: Option<String>,
    },
    Failed {
        message: String,
    },
    Cancelled,
}

impl TransferOutcome {
    fn from_delivery(changeset: Option<ConfigurationUri>, delivery: DeliveryOutcome) -> Self {
        let changeset = changeset.map(|c| c.into_inner());
        match delivery {
            DeliveryOutcome::Delivered(session) => TransferOutcome::Delivered {
                session: session.into_inner(),
                changeset,
            },
            DeliveryOutcome::NothingToDeliver(session) => TransferOutcome::NothingToDeliver {
                session: session.into_inner(),
                changeset,
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TransferOutcome::Failed { .. } | TransferOutcome::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferEntry {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(flatten)]
    pub outcome: TransferOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferReport {
    pub entries: Vec<TransferEntry>,
}

impl TransferReport {
    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.len() - self.failed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}
