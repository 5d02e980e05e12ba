// ABOUTME: Type-system transfer commands: import through a changeset, or deliver directly.
// ABOUTME: Each worklist item runs to completion before the next one starts.

use tokio_util::sync::CancellationToken;

use super::connection::connect;
use super::scenario::Bracket;
use dngcm::config::Config;
use dngcm::diagnostics::Diagnostics;
use dngcm::error::{Error, Result};
use dngcm::output::Output;
use dngcm::workflow::{Automation, TransferEntry, TransferOutcome};
use dngcm::worklist::{TransferItem, Worklist};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Changeset, type import, delivery.
    Import,
    /// Delivery session straight from source to target.
    Deliver,
}

pub async fn transfer(
    config: Config,
    worklist: Worklist<TransferItem>,
    mode: TransferMode,
    bracket: Bracket,
    cancel: CancellationToken,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();
    let client = connect(&config, &output).await?;
    let scenario = bracket.start(&client, &mut diag).await;

    let verb = match mode {
        TransferMode::Import => "Importing",
        TransferMode::Deliver => "Delivering",
    };
    output.progress(&format!("{verb} type systems for {} item(s)", worklist.len()));

    let automation = Automation::new(&client, config.wait_options(cancel), config.verdicts);
    let on_entry = |entry: &TransferEntry| report_item(&output, entry);
    let report = match mode {
        TransferMode::Import => {
            automation
                .import_all(worklist.iter(), &mut diag, on_entry)
                .await
        }
        TransferMode::Deliver => {
            automation
                .deliver_all(worklist.iter(), &mut diag, on_entry)
                .await
        }
    };

    bracket.stop(&client, scenario, &mut diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.data("report", &report);

    if !report.is_success() {
        return Err(Error::ItemsFailed {
            failed: report.failed(),
            total: report.entries.len(),
        });
    }
    output.success(&format!("{} item(s) transferred", report.succeeded()));
    Ok(())
}

fn report_item(output: &Output, entry: &TransferEntry) {
    let label = entry.project.as_deref().unwrap_or(&entry.target);
    let message = match &entry.outcome {
        TransferOutcome::Delivered { session, .. } => format!("{label}: delivered ({session})"),
        TransferOutcome::NothingToDeliver { .. } => format!("{label}: nothing to deliver"),
        TransferOutcome::Failed { message } => format!("{label}: {message}"),
        TransferOutcome::Cancelled => format!("{label}: cancelled"),
    };
    output.item(!entry.outcome.is_failure(), &message);
}
