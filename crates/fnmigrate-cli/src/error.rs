//! Error types for fnmigrate-cli
//!
//! Provides error handling for:
//! - Configuration problems
//! - Target platform rejections
//! - Per-entity creation failures
//! - Whole-run failures

use crate::restore::RestoreReport;
use fnmigrate_model::{EntityKind, FetchError, SnapshotError};
use fnmigrate_remap::ResolveError;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No server URL was given
    #[error("need --server or {} set to your server", crate::config::SERVER_URL_ENV)]
    MissingServer,

    /// Server URL cannot be used as an API base
    #[error("invalid server url '{url}': {reason}")]
    InvalidServer {
        /// URL as given
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Target platform rejections
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// An entity with this name already exists
    #[error("conflict: {message}")]
    Conflict {
        /// Server message
        message: String,
    },

    /// The platform rejected the record
    #[error("validation failed: {message}")]
    Validation {
        /// Server message
        message: String,
    },

    /// Any other error status
    #[error("server returned {status}: {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Server message
        message: String,
    },

    /// Request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not decode
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Creation failure for one entity
///
/// Entities created before the failure are left in place.
#[derive(Debug, thiserror::Error)]
#[error("failed to create {kind} '{new_name}' (legacy name '{old_name}'): {source}")]
pub struct CreateError {
    /// Kind of entity
    pub kind: EntityKind,
    /// Legacy name
    pub old_name: String,
    /// Target name
    pub new_name: String,
    /// What the platform said
    #[source]
    pub source: PlatformError,
    /// What had been created before the failure
    pub created: RestoreReport,
}

/// Migration run errors
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Legacy retrieval failed
    #[error("retrieval failed: {0}")]
    Fetch(#[from] FetchError),

    /// Snapshot could not be loaded or saved
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Snapshot failed integrity checks
    #[error("integrity violation: {0}")]
    Resolve(#[from] ResolveError),

    /// Target platform refused an entity
    #[error(transparent)]
    Create(#[from] CreateError),

    /// Plan could not be encoded
    #[error("failed to encode plan: {0}")]
    Encode(#[from] serde_json::Error),
}

impl MigrateError {
    /// Whether an operator can fix the cause and re-run
    #[inline]
    #[must_use]
    pub fn is_operator_recoverable(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_creation_failures_are_recoverable() {
        assert!(MigrateError::from(ConfigError::MissingServer).is_operator_recoverable());

        let create = CreateError {
            kind: EntityKind::Function,
            old_name: "Hello".into(),
            new_name: "hello".into(),
            source: PlatformError::Conflict {
                message: "exists".into(),
            },
            created: RestoreReport::default(),
        };
        assert!(MigrateError::from(create).is_operator_recoverable());
    }

    #[test]
    fn retrieval_and_integrity_failures_are_not() {
        let fetch = FetchError::NotFound {
            name: "Ghost".into(),
            uid: None,
        };
        assert!(!MigrateError::from(fetch).is_operator_recoverable());

        let resolve = ResolveError::DuplicateTarget {
            first: "A".into(),
            second: "a!".into(),
            target: "a".into(),
        };
        assert!(!MigrateError::from(resolve).is_operator_recoverable());
    }
}
