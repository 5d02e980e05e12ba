// ABOUTME: Library root for dngcm - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod archive;
pub mod changeset;
pub mod config;
pub mod delivery;
pub mod diagnostics;
pub mod error;
pub mod oslc;
pub mod output;
pub mod resources;
pub mod scenario;
pub mod tracker;
pub mod transport;
pub mod type_import;
pub mod types;
pub mod workflow;
pub mod worklist;
