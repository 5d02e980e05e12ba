// ABOUTME: Diagnostics accumulator for non-fatal warnings during automation runs.
// ABOUTME: Cleanup that fails after the real outcome is known is recorded here, not raised.

/// Collects non-fatal warnings during an operation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings of one kind.
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// A non-fatal warning collected during an operation.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A delivery session could not be deleted after a failure.
    pub fn session_not_deleted(session: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::SessionNotDeleted,
            message: format!("delivery session {session} was not deleted: {reason}"),
        }
    }

    /// A changeset could not be discarded after a failure.
    pub fn changeset_not_discarded(changeset: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::ChangesetNotDiscarded,
            message: format!("changeset {changeset} was not discarded: {reason}"),
        }
    }

    /// The server refused to start or stop a performance scenario.
    pub fn scenario(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Scenario,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Failed delivery left its session on the server.
    SessionNotDeleted,
    /// Failed import left its changeset on the server.
    ChangesetNotDiscarded,
    /// Expensive-scenario bookkeeping failed.
    Scenario,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::session_not_deleted("https://rm/ds/1", "409"));
        diag.warn(Warning::scenario("scenario service unavailable"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.of_kind(WarningKind::Scenario).count(), 1);
    }

    #[test]
    fn warning_constructors_set_kind_and_name_the_resource() {
        let warning = Warning::changeset_not_discarded("https://rm/cs/1", "status 500");
        assert_eq!(warning.kind, WarningKind::ChangesetNotDiscarded);
        assert!(warning.message.contains("https://rm/cs/1"));
        assert!(warning.message.contains("status 500"));
    }
}
