//! Legacy state snapshot
//!
//! [`LegacyState`] is the captured legacy state plus the [`NameChanges`]
//! table. It is the unit of persistence: one indented JSON document whose
//! top-level field names never change.

use crate::error::SnapshotError;
use crate::legacy::{Environment, Function, HttpTrigger, LegacyEntity, MessageQueueTrigger, TimeTrigger, Watch};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

/// File name used when no snapshot path is given
pub const DEFAULT_SNAPSHOT_FILE: &str = "legacy-state.json";

/// Captured legacy state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyState {
    /// Functions, one per logical name once resolved
    #[serde(default, deserialize_with = "null_as_default")]
    pub functions: Vec<Function>,

    /// Environments
    #[serde(default, deserialize_with = "null_as_default")]
    pub environments: Vec<Environment>,

    /// HTTP triggers
    #[serde(rename = "httptriggers", default, deserialize_with = "null_as_default")]
    pub http_triggers: Vec<HttpTrigger>,

    /// Message-queue triggers
    #[serde(rename = "mqtriggers", default, deserialize_with = "null_as_default")]
    pub mq_triggers: Vec<MessageQueueTrigger>,

    /// Time triggers
    #[serde(rename = "timetriggers", default, deserialize_with = "null_as_default")]
    pub time_triggers: Vec<TimeTrigger>,

    /// Kubernetes watches
    #[serde(default, deserialize_with = "null_as_default")]
    pub watches: Vec<Watch>,

    /// Old name to new name, filled in by discovery
    #[serde(rename = "namechanges", default, deserialize_with = "null_as_default")]
    pub name_changes: NameChanges,
}

impl LegacyState {
    /// Parse a snapshot document
    ///
    /// # Errors
    /// [`SnapshotError::Deserialization`] if the payload is not a legacy
    /// state document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        serde_json::from_slice(bytes).map_err(SnapshotError::Deserialization)
    }

    /// Encode as an indented JSON document
    ///
    /// # Errors
    /// [`SnapshotError::Serialization`] if encoding fails.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(SnapshotError::Serialization)?;
        Ok(out)
    }

    /// Read a snapshot file
    ///
    /// # Errors
    /// I/O or deserialization failure.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    /// Write a snapshot file, replacing any existing one
    ///
    /// # Errors
    /// I/O or serialization failure.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.to_pretty_json()?;
        fs::write(path, bytes).map_err(|source| SnapshotError::Io {
            action: "write",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every record across all six collections
    ///
    /// Order is fixed: functions, HTTP triggers, message-queue triggers,
    /// watches, time triggers, environments.
    #[must_use]
    pub fn entities(&self) -> Vec<&dyn LegacyEntity> {
        let mut out: Vec<&dyn LegacyEntity> = Vec::with_capacity(self.counts().total());
        out.extend(self.functions.iter().map(|e| e as &dyn LegacyEntity));
        out.extend(self.http_triggers.iter().map(|e| e as &dyn LegacyEntity));
        out.extend(self.mq_triggers.iter().map(|e| e as &dyn LegacyEntity));
        out.extend(self.watches.iter().map(|e| e as &dyn LegacyEntity));
        out.extend(self.time_triggers.iter().map(|e| e as &dyn LegacyEntity));
        out.extend(self.environments.iter().map(|e| e as &dyn LegacyEntity));
        out
    }

    /// Collection sizes
    #[must_use]
    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            functions: self.functions.len(),
            environments: self.environments.len(),
            http_triggers: self.http_triggers.len(),
            mq_triggers: self.mq_triggers.len(),
            time_triggers: self.time_triggers.len(),
            watches: self.watches.len(),
        }
    }
}

/// Sizes of the six collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotCounts {
    /// Functions
    pub functions: usize,
    /// Environments
    pub environments: usize,
    /// HTTP triggers
    pub http_triggers: usize,
    /// Message-queue triggers
    pub mq_triggers: usize,
    /// Time triggers
    pub time_triggers: usize,
    /// Watches
    pub watches: usize,
}

impl SnapshotCounts {
    /// Total number of records
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.functions
            + self.environments
            + self.http_triggers
            + self.mq_triggers
            + self.time_triggers
            + self.watches
    }
}

impl Display for SnapshotCounts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} functions, {} environments, {} HTTP triggers, {} watches, {} message queue triggers, {} time triggers",
            self.functions,
            self.environments,
            self.http_triggers,
            self.watches,
            self.mq_triggers,
            self.time_triggers
        )
    }
}

/// Old name to new name
///
/// Insertion ordered so the persisted table reads in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameChanges(IndexMap<String, String>);

impl NameChanges {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// New name for `old`
    #[inline]
    #[must_use]
    pub fn get(&self, old: &str) -> Option<&str> {
        self.0.get(old).map(String::as_str)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }

    /// Entries whose name actually changed
    pub fn renamed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(old, new)| old != new)
    }

    /// First pair of old names sharing a new name, if any
    ///
    /// Returns `(first_old, second_old, new)`.
    #[must_use]
    pub fn find_collision(&self) -> Option<(&str, &str, &str)> {
        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(self.0.len());
        for (old, new) in self.iter() {
            if let Some(first) = seen.insert(new, old) {
                return Some((first, old, new));
            }
        }
        None
    }
}

impl FromIterator<(String, String)> for NameChanges {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<IndexMap<String, String>> for NameChanges {
    fn from(map: IndexMap<String, String>) -> Self {
        Self(map)
    }
}

// Older dumps encode empty collections as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityKind, Metadata};

    #[test]
    fn null_collections_parse_as_empty() {
        let json = br#"{
            "functions": null,
            "environments": [],
            "httptriggers": null,
            "mqtriggers": null,
            "timetriggers": null,
            "watches": null,
            "namechanges": null
        }"#;
        let state = LegacyState::from_slice(json).unwrap();
        assert_eq!(state, LegacyState::default());
    }

    #[test]
    fn malformed_payload_is_a_deserialization_error() {
        let err = LegacyState::from_slice(br#"{"functions": 7}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Deserialization(_)));

        let err = LegacyState::from_slice(b"not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Deserialization(_)));
    }

    #[test]
    fn pretty_json_uses_stable_field_names_and_four_space_indent() {
        let text = String::from_utf8(LegacyState::default().to_pretty_json().unwrap()).unwrap();
        for field in [
            "functions",
            "environments",
            "httptriggers",
            "mqtriggers",
            "timetriggers",
            "watches",
            "namechanges",
        ] {
            assert!(text.contains(&format!("\n    \"{field}\"")), "missing {field}");
        }
    }

    #[test]
    fn entities_cover_every_collection() {
        let mut state = LegacyState::default();
        state.environments.push(Environment {
            metadata: Metadata::new("env"),
            ..Default::default()
        });
        state.functions.push(Function {
            metadata: Metadata::new("fn"),
            environment: Metadata::new("env"),
            code: String::new(),
        });
        state.watches.push(Watch {
            metadata: Metadata::new("w"),
            function: Metadata::new("fn"),
            ..Default::default()
        });
        state.time_triggers.push(TimeTrigger {
            metadata: Metadata::new("t"),
            cron: "@hourly".into(),
            function: Metadata::new("fn"),
        });

        let kinds: Vec<EntityKind> = state.entities().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Function,
                EntityKind::Watch,
                EntityKind::TimeTrigger,
                EntityKind::Environment,
            ]
        );
        assert_eq!(state.counts().total(), 4);
    }

    #[test]
    fn collision_detection_reports_both_old_names() {
        let table: NameChanges = [
            ("a_b".to_string(), "a-b".to_string()),
            ("ok".to_string(), "ok".to_string()),
            ("a.b".to_string(), "a-b".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.find_collision(), Some(("a_b", "a.b", "a-b")));
        assert_eq!(table.renamed().count(), 2);
    }
}
