// ABOUTME: Archive commands: a dependency-gated batch and a single direct call.
// ABOUTME: Simulation modes install a fault rule on the transport instead of calling the server.

use tokio_util::sync::CancellationToken;

use super::connection::connect;
use super::scenario::Bracket;
use dngcm::archive::{
    ArchiveEntry, ArchiveOutcome, ConfigurationArchiver, LocalVersioningApi, Simulation, archive_all,
};
use dngcm::config::Config;
use dngcm::diagnostics::Diagnostics;
use dngcm::error::{Error, Result};
use dngcm::output::Output;
use dngcm::types::ConfigurationUri;
use dngcm::worklist::{ArchiveItem, Worklist};

pub struct ArchiveOptions {
    pub simulate: Option<Simulation>,
    pub check_archived: bool,
}

pub async fn archive_configurations(
    config: Config,
    worklist: Worklist<ArchiveItem>,
    options: ArchiveOptions,
    bracket: Bracket,
    cancel: CancellationToken,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();
    let mut client = connect(&config, &output).await?;
    if let Some(simulation) = options.simulate {
        output.warning(&format!("simulating {simulation:?}; no configuration is archived"));
        client = client.with_rule(simulation.rule());
    }
    let scenario = bracket.start(&client, &mut diag).await;

    output.progress(&format!("Archiving {} configuration(s)", worklist.len()));
    let configurations: Vec<ConfigurationUri> =
        worklist.iter().map(|item| item.configuration.clone()).collect();
    let api = LocalVersioningApi::new(&client);
    let report = archive_all(&api, &api, &configurations, options.check_archived, &cancel).await;
    for entry in &report.entries {
        report_entry(&output, entry);
    }

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
    output.success(&format!(
        "{} archived, {} skipped",
        report.archived(),
        report.skipped()
    ));
    Ok(())
}

fn report_entry(output: &Output, entry: &ArchiveEntry) {
    let uri = &entry.configuration;
    let message = match &entry.outcome {
        ArchiveOutcome::Archived => format!("{uri}: archived"),
        ArchiveOutcome::AlreadyArchived => format!("{uri}: already archived"),
        ArchiveOutcome::HasDependents { count } => {
            format!("{uri}: skipped, {count} dependent configuration(s)")
        }
        ArchiveOutcome::GateFailed { message } => format!("{uri}: dependency check failed: {message}"),
        ArchiveOutcome::ArchiveFailed { message } => format!("{uri}: archive failed: {message}"),
        ArchiveOutcome::Cancelled => format!("{uri}: cancelled"),
    };
    output.item(!entry.outcome.is_failure(), &message);
}

/// Archive one configuration without consulting the dependency gate.
pub async fn archive_configuration(
    config: Config,
    configuration: ConfigurationUri,
    bracket: Bracket,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();
    let client = connect(&config, &output).await?;
    let scenario = bracket.start(&client, &mut diag).await;

    output.progress(&format!("Archiving {configuration} with descendants"));
    let status = LocalVersioningApi::new(&client)
        .archive_with_descendants(&configuration)
        .await;

    bracket.stop(&client, scenario, &mut diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.data("status", &status);

    if !status.succeeded() {
        return Err(Error::ArchiveFailed(status.message().to_string()));
    }
    output.success(&format!("{configuration} archived"));
    Ok(())
}
