// ABOUTME: Command module aggregator for the dngcm CLI.
// ABOUTME: Re-exports transfer, archive and browse command handlers.

mod archive;
mod browse;
mod connection;
mod scenario;
mod transfer;

pub use archive::{ArchiveOptions, archive_configuration, archive_configurations};
pub use browse::{MapOptions, inspect, list_configurations, map_configurations};
pub use scenario::Bracket;
pub use transfer::{TransferMode, transfer};
