//! fnmigrate Remapping Engine
//!
//! Identifier remapping and referential integrity for legacy state migration.
//!
//! # Overview
//!
//! A migration run goes through three passes:
//! - **Discovery** ([`Resolver::discover`]): every entity name and every
//!   referenced name is fed through a [`NameRemapper`]; referenced functions
//!   are collected into a logical function set.
//! - **Collection** ([`Resolver::fetch_functions`]): one authoritative record
//!   per logical function, duplicates by name collapsed.
//! - **Rewrite** ([`rewrite`]): every target record is rebuilt with renamed
//!   identities and references.
//!
//! # Example
//!
//! ```rust
//! use fnmigrate_remap::{is_valid_name, NameRemapper};
//!
//! let mut remapper = NameRemapper::new();
//! let new = remapper.remap("Hello_World");
//! assert_eq!(new, "hello-world");
//! assert!(is_valid_name(new));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod naming;
pub mod remapper;
pub mod resolver;
pub mod rewrite;

// Re-exports
pub use error::ResolveError;
pub use naming::{derive_candidate, is_valid_name, MAX_NAME_LEN, SUFFIX_RESERVE};
pub use remapper::NameRemapper;
pub use resolver::{resolve_snapshot, Resolver};
pub use rewrite::{rewrite, MigrationPlan, PackageNamer, Planned, PlannedFunction, RandomPackageNamer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for a migration run
    pub use crate::{
        resolve_snapshot, rewrite, MigrationPlan, NameRemapper, PackageNamer, RandomPackageNamer,
        ResolveError, Resolver,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
