//! Error types for the rewrite pass
//!
//! Every variant is an integrity violation: discovery missed a name, the
//! snapshot was edited inconsistently, or the table is corrupt. None of them
//! is retried.

use fnmigrate_model::EntityKind;

/// Rewrite failures
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A name has no entry in the name-change table
    #[error("{kind} '{entity}' has no name-change entry for '{name}' ({field})")]
    UnresolvedReference {
        /// Kind of the entity being rewritten
        kind: EntityKind,
        /// Legacy name of the entity being rewritten
        entity: String,
        /// Field holding the unresolved name
        field: &'static str,
        /// The unresolved legacy name
        name: String,
    },

    /// A reference points at an entity that is not being migrated
    #[error("{kind} '{entity}' references {target_kind} '{target}', which is not part of the migration")]
    DanglingReference {
        /// Kind of the referencing entity
        kind: EntityKind,
        /// Legacy name of the referencing entity
        entity: String,
        /// Kind of the missing entity
        target_kind: EntityKind,
        /// Legacy name of the missing entity
        target: String,
    },

    /// Two legacy names share one target name
    #[error("name-change table maps both '{first}' and '{second}' to '{target}'")]
    DuplicateTarget {
        /// First legacy name
        first: String,
        /// Second legacy name
        second: String,
        /// Shared target name
        target: String,
    },

    /// Function code is not valid base64
    #[error("function '{function}' has undecodable code: {source}")]
    InvalidCode {
        /// Legacy function name
        function: String,
        /// Decoder error
        #[source]
        source: base64::DecodeError,
    },
}

impl ResolveError {
    /// Kind of entity the error is about, when there is one
    #[must_use]
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Self::UnresolvedReference { kind, .. } | Self::DanglingReference { kind, .. } => {
                Some(*kind)
            }
            Self::InvalidCode { .. } => Some(EntityKind::Function),
            Self::DuplicateTarget { .. } => None,
        }
    }
}
