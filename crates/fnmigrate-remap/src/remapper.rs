//! Name remapper
//!
//! Turns arbitrary legacy names into valid, unique target names and remembers
//! every decision, so each legacy name maps to exactly one target name for the
//! lifetime of the remapper.

use crate::naming::{derive_candidate, is_valid_name};
use fnmigrate_model::NameChanges;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Stateful legacy-to-target name allocator
///
/// Allocation is strictly sequential: the output for a name depends on every
/// name remapped before it, so a remapper belongs to exactly one migration run.
///
/// # Example
/// ```
/// use fnmigrate_remap::NameRemapper;
///
/// let mut remapper = NameRemapper::new();
/// assert_eq!(remapper.remap("my_function!"), "my-function");
/// assert_eq!(remapper.remap("my_function#"), "my-function-1");
/// assert_eq!(remapper.remap("ok-name"), "ok-name");
/// // repeated lookups are stable
/// assert_eq!(remapper.remap("my_function!"), "my-function");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameRemapper {
    /// Decisions in the order they were made
    old_to_new: IndexMap<String, String>,
    /// Every target name handed out
    used: HashSet<String>,
}

impl NameRemapper {
    /// Empty remapper
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target name for `old`, allocating one on first sight
    ///
    /// A name that is already valid and not yet handed out is kept unchanged.
    /// Anything else is derived with [`derive_candidate`] and, if taken,
    /// suffixed with the smallest free `-1`, `-2`, ...
    pub fn remap(&mut self, old: &str) -> &str {
        if let Some(index) = self.old_to_new.get_index_of(old) {
            return &self.old_to_new[index];
        }

        let new = if is_valid_name(old) && !self.used.contains(old) {
            old.to_owned()
        } else {
            self.first_unused(derive_candidate(old))
        };

        if new != old {
            tracing::debug!(old, new = %new, "renamed");
        }

        self.used.insert(new.clone());
        let (index, _) = self.old_to_new.insert_full(old.to_owned(), new);
        &self.old_to_new[index]
    }

    /// Previously allocated target name for `old`
    #[inline]
    #[must_use]
    pub fn lookup(&self, old: &str) -> Option<&str> {
        self.old_to_new.get(old).map(String::as_str)
    }

    /// Whether `name` has been handed out
    #[inline]
    #[must_use]
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Number of legacy names seen
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.old_to_new.len()
    }

    /// Whether no name has been remapped yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.old_to_new.is_empty()
    }

    /// Freeze the decisions into a name-change table
    #[must_use]
    pub fn into_name_changes(self) -> NameChanges {
        NameChanges::from(self.old_to_new)
    }

    // Terminates within |used| + 1 probes. Suffixes are unbounded, so a long
    // enough run of collisions can push the result past MAX_NAME_LEN.
    fn first_unused(&self, base: String) -> String {
        if !self.used.contains(&base) {
            return base;
        }
        let mut suffix: u64 = 1;
        loop {
            let probe = format!("{base}-{suffix}");
            if !self.used.contains(&probe) {
                return probe;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remap_all(names: &[&str]) -> Vec<String> {
        let mut remapper = NameRemapper::new();
        names.iter().map(|n| remapper.remap(n).to_owned()).collect()
    }

    #[test]
    fn scenario_symbols_collide_valid_name_kept() {
        assert_eq!(
            remap_all(&["my_function!", "my_function#", "ok-name"]),
            vec!["my-function", "my-function-1", "ok-name"]
        );
    }

    #[test]
    fn sanitized_collisions_take_increasing_suffixes() {
        assert_eq!(
            remap_all(&["a_b", "a.b", "a b"]),
            vec!["a-b", "a-b-1", "a-b-2"]
        );
    }

    #[test]
    fn valid_name_already_handed_out_is_suffixed() {
        assert_eq!(remap_all(&["a_b", "a-b"]), vec!["a-b", "a-b-1"]);
        assert_eq!(remap_all(&["a_b", "a.b", "a-b-1"]), vec!["a-b", "a-b-1", "a-b-1-1"]);
    }

    #[test]
    fn valid_but_unused_name_is_a_fixed_point() {
        assert_eq!(remap_all(&["ab", "a-b", "a_b"]), vec!["ab", "a-b", "a-b-1"]);
    }

    #[test]
    fn repeat_lookup_does_not_consume_a_slot() {
        let mut remapper = NameRemapper::new();
        assert_eq!(remapper.remap("Foo"), "foo");
        assert_eq!(remapper.remap("Foo"), "foo");
        assert_eq!(remapper.len(), 1);
        assert_eq!(remapper.remap("FOO"), "foo-1");
    }

    #[test]
    fn empty_candidates_are_not_special_cased() {
        assert_eq!(remap_all(&["!!!", "???", "###"]), vec!["", "-1", "-2"]);
    }

    #[test]
    fn overlong_valid_name_is_truncated() {
        let old = "a".repeat(70);
        let mut remapper = NameRemapper::new();
        assert_eq!(remapper.remap(&old), "a".repeat(59));
    }

    #[test]
    fn lookup_and_table_reflect_decisions() {
        let mut remapper = NameRemapper::new();
        remapper.remap("Hello");
        remapper.remap("world");

        assert_eq!(remapper.lookup("Hello"), Some("hello"));
        assert_eq!(remapper.lookup("missing"), None);
        assert!(remapper.is_used("world"));

        let table = remapper.into_name_changes();
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![("Hello", "hello"), ("world", "world")]);
    }
}
