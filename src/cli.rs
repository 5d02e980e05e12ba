// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use dngcm::archive::Simulation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dngcm")]
#[command(about = "Configuration-management automation for DOORS Next")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RM application URL, e.g. https://clm.example.com:9443/rm
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// User to log in as
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, global = true, env = "DNGCM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Config file (default: discover dngcm.yml in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output (for CI)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Announce the run to the server as an expensive scenario
    #[arg(long, global = true)]
    pub scenario: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new dngcm.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Import type systems into targets through a changeset, then deliver it
    ImportTypeSystem {
        /// YAML worklist of {source, target} items
        #[arg(short, long)]
        worklist: PathBuf,
    },

    /// Deliver type systems from sources straight into targets
    DeliverTypeSystem {
        /// YAML worklist of {source, target} items
        #[arg(short, long)]
        worklist: PathBuf,
    },

    /// Archive every configuration in a worklist that has no dependents
    ArchiveConfigurations {
        /// YAML worklist of configurations
        #[arg(short, long)]
        worklist: PathBuf,

        /// Simulate a server behavior instead of calling the archive endpoints
        #[arg(long, value_enum)]
        simulate: Option<Simulation>,

        /// Do not ask whether a configuration is already archived
        #[arg(long)]
        skip_archived_check: bool,
    },

    /// Archive one configuration and its descendants
    ArchiveConfiguration {
        #[arg(short, long)]
        configuration: String,
    },

    /// Show a configuration, its kind and component
    Inspect {
        #[arg(short, long)]
        configuration: String,
    },

    /// List the configurations of a component
    ListConfigurations {
        #[arg(long)]
        component: String,
    },

    /// Build an import worklist from tagged stream descriptions
    MapConfigurations {
        /// Components whose streams are searched
        #[arg(long = "component", required = true)]
        components: Vec<String>,

        /// Tag in the description of the single source stream
        #[arg(long)]
        source_tag: String,

        /// Tag in the descriptions of the target streams
        #[arg(long)]
        target_tag: String,

        /// Write the worklist here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Name used for scenario bracketing.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::ImportTypeSystem { .. } => "import-type-system",
            Commands::DeliverTypeSystem { .. } => "deliver-type-system",
            Commands::ArchiveConfigurations { .. } => "archive-configurations",
            Commands::ArchiveConfiguration { .. } => "archive-configuration",
            Commands::Inspect { .. } => "inspect",
            Commands::ListConfigurations { .. } => "list-configurations",
            Commands::MapConfigurations { .. } => "map-configurations",
        }
    }
}
