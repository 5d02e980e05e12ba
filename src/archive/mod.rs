// ABOUTME: Dependency-gated archiving of configurations.
// ABOUTME: A configuration is archived only after the gate call succeeded and found no dependents.

mod api;

pub use api::LocalVersioningApi;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::transport::{Fault, FaultRule, Method};
use crate::oslc::vocab::internal;
use crate::types::ConfigurationUri;

// =============================================================================
// CallStatus
// =============================================================================

/// Outcome of one gated synchronous call.
///
/// Callers branch on whether the call succeeded before looking at its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallStatus {
    /// The call did not complete as expected.
    Failed { message: String },
    /// The call completed and the server gave a business answer.
    Answered {
        result: bool,
        count: Option<u32>,
        message: String,
    },
}

impl CallStatus {
    pub fn failed(message: impl Into<String>) -> Self {
        CallStatus::Failed {
            message: message.into(),
        }
    }

    pub fn answered(result: bool, count: Option<u32>, message: impl Into<String>) -> Self {
        CallStatus::Answered {
            result,
            count,
            message: message.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, CallStatus::Answered { .. })
    }

    /// The business answer. `None` when the call failed.
    pub fn result(&self) -> Option<bool> {
        match self {
            CallStatus::Answered { result, .. } => Some(*result),
            CallStatus::Failed { .. } => None,
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            CallStatus::Answered { count, .. } => *count,
            CallStatus::Failed { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CallStatus::Failed { message } | CallStatus::Answered { message, .. } => message,
        }
    }
}

// =============================================================================
// Seams
// =============================================================================

/// Answers whether a configuration has dependent configurations.
#[async_trait]
pub trait DependencyGate: Send + Sync {
    /// `Answered { result: true }` iff the server reports zero dependents.
    async fn has_no_dependents(&self, configuration: &ConfigurationUri) -> CallStatus;
}

/// Archives configurations and reports their archive flag.
#[async_trait]
pub trait ConfigurationArchiver: Send + Sync {
    async fn archive_with_descendants(&self, configuration: &ConfigurationUri) -> CallStatus;

    async fn is_archived(&self, configuration: &ConfigurationUri) -> CallStatus;
}

// =============================================================================
// Workflow
// =============================================================================

/// What happened to one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ArchiveOutcome {
    Archived,
    AlreadyArchived,
    /// Skipped; the gate found dependents.
    HasDependents { count: u32 },
    /// The dependency check itself failed; nothing was archived.
    GateFailed { message: String },
    ArchiveFailed { message: String },
    /// The batch was cancelled before this entry was processed.
    Cancelled,
}

impl ArchiveOutcome {
    /// Gate and archive failures. Skips for dependents are not failures.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ArchiveOutcome::GateFailed { .. }
                | ArchiveOutcome::ArchiveFailed { .. }
                | ArchiveOutcome::Cancelled
        )
    }
}

/// Archive `configuration` with its descendants if nothing depends on it.
///
/// When `check_archived` is set, a configuration the server already reports
/// as archived is left alone. A failed archived-flag query is logged and the
/// gate decides.
pub async fn archive_configuration<G, A>(
    gate: &G,
    archiver: &A,
    configuration: &ConfigurationUri,
    check_archived: bool,
) -> ArchiveOutcome
where
    G: DependencyGate + ?Sized,
    A: ConfigurationArchiver + ?Sized,
{
    if check_archived {
        let status = archiver.is_archived(configuration).await;
        match status.result() {
            Some(true) => {
                tracing::info!(%configuration, "already archived");
                return ArchiveOutcome::AlreadyArchived;
            }
            Some(false) => {}
            None => {
                tracing::warn!(%configuration, message = status.message(), "archived check failed")
            }
        }
    }

    let gate_status = gate.has_no_dependents(configuration).await;
    match gate_status {
        CallStatus::Failed { message } => {
            tracing::error!(%configuration, %message, "dependency check failed, not archiving");
            return ArchiveOutcome::GateFailed { message };
        }
        CallStatus::Answered { result: false, count, .. } => {
            let count = count.unwrap_or_default();
            tracing::info!(%configuration, count, "skipping, configuration has dependents");
            return ArchiveOutcome::HasDependents { count };
        }
        CallStatus::Answered { result: true, .. } => {}
    }

    tracing::info!(%configuration, "archiving");
    match archiver.archive_with_descendants(configuration).await {
        CallStatus::Answered { .. } => ArchiveOutcome::Archived,
        CallStatus::Failed { message } => {
            tracing::error!(%configuration, %message, "archive failed");
            ArchiveOutcome::ArchiveFailed { message }
        }
    }
}

/// Per-configuration outcomes of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveReport {
    pub entries: Vec<ArchiveEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub configuration: ConfigurationUri,
    #[serde(flatten)]
    pub outcome: ArchiveOutcome,
}

impl ArchiveReport {
    pub fn archived(&self) -> usize {
        self.count(|o| *o == ArchiveOutcome::Archived)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                ArchiveOutcome::AlreadyArchived | ArchiveOutcome::HasDependents { .. }
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(ArchiveOutcome::is_failure)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, predicate: impl Fn(&ArchiveOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// Archive each configuration in order. One entry's failure never stops the batch.
pub async fn archive_all<G, A>(
    gate: &G,
    archiver: &A,
    configurations: &[ConfigurationUri],
    check_archived: bool,
    cancel: &CancellationToken,
) -> ArchiveReport
where
    G: DependencyGate + ?Sized,
    A: ConfigurationArchiver + ?Sized,
{
    let mut report = ArchiveReport::default();
    for configuration in configurations {
        let outcome = if cancel.is_cancelled() {
            ArchiveOutcome::Cancelled
        } else {
            archive_configuration(gate, archiver, configuration, check_archived).await
        };
        report.entries.push(ArchiveEntry {
            configuration: configuration.clone(),
            outcome,
        });
    }
    report
}

// =============================================================================
// Simulation
// =============================================================================

/// Server behaviors that can be simulated without touching real configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Simulation {
    /// The dependency query answers 400.
    GateRejected,
    /// The dependency query never reaches the server.
    GateUnreachable,
    /// The archive call answers 200 without reaching the server.
    Archived,
    /// The archive call answers 400.
    ArchiveRejected,
}

impl Simulation {
    /// Fault rule to install on the transport.
    pub fn rule(self) -> FaultRule {
        let gate = internal::DEPENDENT_CONFIGURATIONS
            .split('?')
            .next()
            .unwrap_or(internal::DEPENDENT_CONFIGURATIONS);
        let archive = internal::ARCHIVE_WITH_DESCENDANTS
            .split('?')
            .next()
            .unwrap_or(internal::ARCHIVE_WITH_DESCENDANTS);
        match self {
            Simulation::GateRejected => FaultRule::new(Method::Get, gate, Fault::Status(400)),
            Simulation::GateUnreachable => FaultRule::new(Method::Get, gate, Fault::Fail),
            Simulation::Archived => FaultRule::new(Method::Post, archive, Fault::Status(200)),
            Simulation::ArchiveRejected => FaultRule::new(Method::Post, archive, Fault::Status(400)),
        }
    }
}
