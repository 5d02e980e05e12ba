// ABOUTME: Entry point for the dngcm CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{ArchiveOptions, Bracket, MapOptions, TransferMode};
use dngcm::config::{self, Config, Overrides};
use dngcm::error::{Error, Result};
use dngcm::output::{Output, OutputMode};
use dngcm::types::{ComponentUri, ConfigurationUri};
use dngcm::worklist::Worklist;
use std::env;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins unless --verbose asks for everything
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = output_mode(&cli);
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling the running operation");
            on_interrupt.cancel();
        }
    });

    if let Err(e) = run(cli, cancel).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

fn output_mode(cli: &Cli) -> OutputMode {
    if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    }
}

/// File config (explicit or discovered) with command-line values on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let overrides = Overrides {
        url: cli.url.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
    };

    let discovered = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::discover(&env::current_dir()?),
    };
    match discovered {
        Ok(mut config) => {
            config.apply(&overrides)?;
            Ok(config)
        }
        Err(Error::ConfigNotFound(_)) if overrides.url.is_some() => {
            Config::from_overrides(&overrides)
        }
        Err(e) => Err(e),
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let output = Output::new(output_mode(&cli));
    let bracket = Bracket::new(cli.command.name(), cli.scenario);

    match &cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, cli.url.as_deref(), cli.user.as_deref(), *force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::ImportTypeSystem { worklist } => {
            let config = load_config(&cli)?;
            let worklist = Worklist::load(worklist)?;
            commands::transfer(config, worklist, TransferMode::Import, bracket, cancel, output).await
        }
        Commands::DeliverTypeSystem { worklist } => {
            let config = load_config(&cli)?;
            let worklist = Worklist::load(worklist)?;
            commands::transfer(config, worklist, TransferMode::Deliver, bracket, cancel, output).await
        }
        Commands::ArchiveConfigurations {
            worklist,
            simulate,
            skip_archived_check,
        } => {
            let config = load_config(&cli)?;
            let worklist = Worklist::load(worklist)?;
            let options = ArchiveOptions {
                simulate: *simulate,
                check_archived: !skip_archived_check,
            };
            commands::archive_configurations(config, worklist, options, bracket, cancel, output).await
        }
        Commands::ArchiveConfiguration { configuration } => {
            let config = load_config(&cli)?;
            let uri = ConfigurationUri::new(configuration.as_str());
            commands::archive_configuration(config, uri, bracket, output).await
        }
        Commands::Inspect { configuration } => {
            let config = load_config(&cli)?;
            commands::inspect(config, ConfigurationUri::new(configuration.as_str()), output).await
        }
        Commands::ListConfigurations { component } => {
            let config = load_config(&cli)?;
            commands::list_configurations(config, ComponentUri::new(component.as_str()), output).await
        }
        Commands::MapConfigurations {
            components,
            source_tag,
            target_tag,
            output: destination,
        } => {
            let config = load_config(&cli)?;
            let options = MapOptions {
                components: components.iter().map(|c| ComponentUri::new(c.as_str())).collect(),
                source_tag: source_tag.clone(),
                target_tag: target_tag.clone(),
                destination: destination.clone(),
            };
            commands::map_configurations(config, options, output).await
        }
    }
}
