//! fnmigrate CLI
//!
//! Dump a legacy server's state to a snapshot file and restore it onto the
//! target platform with every name made constraint-valid.
//!
//! # Overview
//!
//! - [`dump`]: capture, resolve and save legacy state
//! - [`restore`]: rewrite a snapshot and create it in dependency order
//! - [`legacy_client`] / [`platform`]: the HTTP edges
//! - [`config`]: run configuration

#![warn(missing_docs)]

pub mod config;
pub mod dump;
pub mod error;
pub mod legacy_client;
pub mod logging;
pub mod platform;
pub mod restore;

// Re-exports
pub use config::MigrateConfig;
pub use dump::{dump, dump_from_server, DumpSummary};
pub use error::{ConfigError, CreateError, MigrateError, PlatformError};
pub use legacy_client::LegacyClient;
pub use platform::{HttpPlatform, TargetPlatform};
pub use restore::{plan_from_snapshot, plan_json, restore, restore_to_server, RestoreReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
