//! fnmigrate Model
//!
//! Plain data types shared by every stage of a migration run.
//!
//! # Overview
//!
//! - **Legacy records** ([`legacy`]): the loosely named entities captured from
//!   a legacy server, each identified by a [`Metadata`].
//! - **Snapshot** ([`LegacyState`]): the six legacy collections plus the
//!   [`NameChanges`] table, persisted as one JSON document.
//! - **Sources** ([`source`]): how legacy records are obtained.
//! - **Target records** ([`target`]): the strictly named records handed to
//!   the target platform once every name has been remapped.
//!
//! # Example
//!
//! ```rust
//! use fnmigrate_model::{LegacyState, Metadata};
//! use fnmigrate_model::legacy::Environment;
//!
//! let mut state = LegacyState::default();
//! state.environments.push(Environment {
//!     metadata: Metadata::new("nodejs"),
//!     run_container_image_url: "registry/node-env".into(),
//! });
//!
//! let bytes = state.to_pretty_json().unwrap();
//! let restored = LegacyState::from_slice(&bytes).unwrap();
//! assert_eq!(state, restored);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod legacy;
pub mod metadata;
pub mod snapshot;
pub mod source;
pub mod target;

// Re-exports
pub use error::{FetchError, SnapshotError};
pub use legacy::LegacyEntity;
pub use metadata::{EntityKind, Metadata};
pub use snapshot::{LegacyState, NameChanges, SnapshotCounts, DEFAULT_SNAPSHOT_FILE};
pub use source::{FunctionSource, StateSource};
pub use target::{ObjectMeta, TargetRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
