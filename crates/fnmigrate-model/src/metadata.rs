//! Entity identity
//!
//! [`Metadata`] names a legacy entity; [`EntityKind`] says which collection it
//! came from.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Identity of a legacy entity
///
/// Two values are the same *instance* only when both `name` and `uid` match.
/// They are the same *logical entity* when `name` matches, whatever the uid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    /// Entity name, unconstrained on the legacy side
    pub name: String,

    /// Version tag distinguishing historical revisions of one name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Metadata {
    /// Metadata without a uid
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: None,
        }
    }

    /// Metadata qualified by a uid
    #[inline]
    #[must_use]
    pub fn with_uid(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: Some(uid.into()),
        }
    }

    /// The uid, treating an empty string as absent
    #[inline]
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref().filter(|uid| !uid.is_empty())
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.uid() {
            Some(uid) => write!(f, "{}@{}", self.name, uid),
            None => f.write_str(&self.name),
        }
    }
}

/// Which collection an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Serverless function
    Function,
    /// Runtime environment
    Environment,
    /// Deployment package (target side only)
    Package,
    /// HTTP route trigger
    HttpTrigger,
    /// Message-queue trigger
    MessageQueueTrigger,
    /// Cron trigger
    TimeTrigger,
    /// Kubernetes object watch
    Watch,
}

impl EntityKind {
    /// Human readable label used in logs and errors
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Environment => "environment",
            Self::Package => "package",
            Self::HttpTrigger => "http trigger",
            Self::MessageQueueTrigger => "message queue trigger",
            Self::TimeTrigger => "time trigger",
            Self::Watch => "kubernetes watch trigger",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
