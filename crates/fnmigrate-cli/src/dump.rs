//! Dump
//!
//! Captures a legacy server's state, resolves it and writes the snapshot.

use crate::config::MigrateConfig;
use crate::error::MigrateError;
use crate::legacy_client::LegacyClient;
use fnmigrate_model::{FunctionSource, LegacyState, SnapshotCounts, StateSource};
use fnmigrate_remap::resolve_snapshot;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

/// What a dump wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSummary {
    /// Snapshot file
    pub path: PathBuf,
    /// Records saved
    pub counts: SnapshotCounts,
    /// Names that changed
    pub renamed: usize,
}

impl Display for DumpSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "saved {} functions, {} HTTP triggers, {} watches, {} message queue triggers, {} time triggers",
            self.counts.functions,
            self.counts.http_triggers,
            self.counts.watches,
            self.counts.mq_triggers,
            self.counts.time_triggers
        )
    }
}

/// Capture, resolve and save the state served by `source`
///
/// # Errors
/// [`MigrateError::Fetch`] if retrieval fails, [`MigrateError::Snapshot`] if
/// the file cannot be written. Nothing is written on retrieval failure.
pub fn dump<S>(source: &S, path: &Path) -> Result<DumpSummary, MigrateError>
where
    S: StateSource + FunctionSource + ?Sized,
{
    let listing = source.fetch_state()?;
    tracing::debug!(counts = %listing.counts(), "retrieved legacy listing");

    let state: LegacyState = resolve_snapshot(listing, source)?;
    for (old, new) in state.name_changes.renamed() {
        tracing::debug!(old, new, "renamed");
    }

    state.save(path)?;
    tracing::info!(path = %path.display(), "wrote snapshot");

    Ok(DumpSummary {
        path: path.to_path_buf(),
        counts: state.counts(),
        renamed: state.name_changes.renamed().count(),
    })
}

/// Dump the configured legacy server to the configured snapshot file
///
/// # Errors
/// Any [`MigrateError`] raised on the way.
pub fn dump_from_server(config: &MigrateConfig) -> Result<DumpSummary, MigrateError> {
    let client = LegacyClient::new(config)?;
    client.ensure_legacy_server()?;
    dump(&client, &config.snapshot_path)
}
