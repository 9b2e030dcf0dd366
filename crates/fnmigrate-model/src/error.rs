//! Error types for snapshot persistence and legacy retrieval

use std::path::PathBuf;

/// Snapshot loading and saving errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Payload does not have the shape of a legacy state document
    #[error("invalid snapshot document: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Snapshot could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Snapshot file could not be read or written
    #[error("failed to {action} snapshot file {}: {source}", path.display())]
    Io {
        /// What was attempted
        action: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Legacy retrieval errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Requested function does not exist on the legacy server
    #[error("function '{name}' not found{}", uid_suffix(.uid.as_deref()))]
    NotFound {
        /// Function name
        name: String,
        /// Requested uid
        uid: Option<String>,
    },

    /// Server is reachable but does not speak the legacy API
    #[error("server {url} is not a legacy server")]
    NotLegacyServer {
        /// Probed URL
        url: String,
    },

    /// Request failed before a usable response arrived
    #[error("failed to fetch {what}: {message}")]
    Transport {
        /// Resource being fetched
        what: String,
        /// Failure description
        message: String,
    },

    /// Response body did not decode
    #[error("unexpected response for {what}: {message}")]
    Decode {
        /// Resource being fetched
        what: String,
        /// Failure description
        message: String,
    },
}

fn uid_suffix(uid: Option<&str>) -> String {
    uid.map(|uid| format!(" (uid {uid})")).unwrap_or_default()
}
