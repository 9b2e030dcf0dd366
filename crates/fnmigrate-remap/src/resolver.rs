//! Discovery and function collection
//!
//! The [`Resolver`] walks a captured [`LegacyState`] twice, feeding entity
//! names and then referenced names through a [`NameRemapper`] and recording
//! which logical functions are referenced. It then fetches one
//! authoritative record per logical function and freezes the name-change
//! table.

use crate::remapper::NameRemapper;
use fnmigrate_model::legacy::Function;
use fnmigrate_model::{
    EntityKind, FetchError, FunctionSource, LegacyEntity, LegacyState, Metadata, NameChanges,
};
use indexmap::IndexMap;

/// Discovery state for one migration run
#[derive(Debug, Default)]
pub struct Resolver {
    remapper: NameRemapper,
    /// Logical functions keyed by name, holding the uid to fetch with
    functions: IndexMap<String, Metadata>,
}

impl Resolver {
    /// Fresh resolver with an empty remapper
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track every entity of `state`
    ///
    /// Own names are claimed before any referenced name.
    pub fn discover(&mut self, state: &LegacyState) {
        let entities = state.entities();
        for entity in &entities {
            self.track_own(*entity);
        }
        for entity in &entities {
            self.track_references(*entity);
        }
        tracing::debug!(
            names = self.remapper.len(),
            functions = self.functions.len(),
            "discovery complete"
        );
    }

    /// Track one entity: its own name, then the names it references
    pub fn track(&mut self, entity: &dyn LegacyEntity) {
        self.track_own(entity);
        self.track_references(entity);
    }

    fn track_own(&mut self, entity: &dyn LegacyEntity) {
        let metadata = entity.metadata();
        self.remapper.remap(&metadata.name);
        if entity.kind() == EntityKind::Function {
            self.record_function(metadata);
        }
    }

    fn track_references(&mut self, entity: &dyn LegacyEntity) {
        if let Some(function) = entity.function_ref() {
            self.remapper.remap(&function.name);
            self.record_function(function);
        }
        if let Some(environment) = entity.environment_ref() {
            self.remapper.remap(&environment.name);
        }
    }

    /// Logical functions discovered so far, in discovery order
    pub fn logical_functions(&self) -> impl Iterator<Item = &Metadata> {
        self.functions.values()
    }

    /// The remapper backing this resolver
    #[inline]
    #[must_use]
    pub fn remapper(&self) -> &NameRemapper {
        &self.remapper
    }

    /// Fetch one record per logical function
    ///
    /// Functions come back in discovery order, at most one per name. Names
    /// inside the fetched records are tracked as well.
    ///
    /// # Errors
    /// The first fetch failure aborts collection; a partial function set
    /// would silently orphan triggers later.
    pub fn fetch_functions<S>(&mut self, source: &S) -> Result<Vec<Function>, FetchError>
    where
        S: FunctionSource + ?Sized,
    {
        let wanted: Vec<Metadata> = self.functions.values().cloned().collect();
        let mut fetched: IndexMap<String, Function> = IndexMap::with_capacity(wanted.len());

        for metadata in &wanted {
            tracing::debug!(function = %metadata, "fetching function");
            let function = source.fetch_function(&metadata.name, metadata.uid())?;
            if function.metadata.name != metadata.name {
                tracing::warn!(
                    requested = %metadata.name,
                    returned = %function.metadata.name,
                    "legacy server returned a differently named function"
                );
            }
            self.track(&function);
            fetched.entry(function.metadata.name.clone()).or_insert(function);
        }

        Ok(fetched.into_values().collect())
    }

    /// Freeze the name-change table
    #[must_use]
    pub fn finish(self) -> NameChanges {
        self.remapper.into_name_changes()
    }

    // A uid-qualified reference wins over an unqualified one; among
    // qualified ones the last seen wins.
    fn record_function(&mut self, metadata: &Metadata) {
        match self.functions.get_mut(&metadata.name) {
            Some(existing) => {
                if let Some(uid) = metadata.uid() {
                    existing.uid = Some(uid.to_owned());
                }
            }
            None => {
                let logical = Metadata {
                    name: metadata.name.clone(),
                    uid: metadata.uid().map(str::to_owned),
                };
                self.functions.insert(metadata.name.clone(), logical);
            }
        }
    }
}

/// Resolve a freshly captured state
///
/// Runs discovery, replaces the function collection with one fetched record
/// per logical function, and stores the completed name-change table.
///
/// # Errors
/// Propagates the first [`FetchError`].
pub fn resolve_snapshot<S>(mut state: LegacyState, source: &S) -> Result<LegacyState, FetchError>
where
    S: FunctionSource + ?Sized,
{
    let mut resolver = Resolver::new();
    resolver.discover(&state);
    state.functions = resolver.fetch_functions(source)?;
    state.name_changes = resolver.finish();
    tracing::info!(
        functions = state.functions.len(),
        renamed = state.name_changes.renamed().count(),
        "resolved legacy snapshot"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnmigrate_model::legacy::{HttpTrigger, TimeTrigger};

    #[test]
    fn triggers_contribute_logical_functions() {
        let state = LegacyState {
            time_triggers: vec![TimeTrigger {
                metadata: Metadata::new("nightly"),
                cron: "@daily".into(),
                function: Metadata::with_uid("Report", "7"),
            }],
            ..Default::default()
        };

        let mut resolver = Resolver::new();
        resolver.discover(&state);

        let functions: Vec<&Metadata> = resolver.logical_functions().collect();
        assert_eq!(functions, vec![&Metadata::with_uid("Report", "7")]);
        assert_eq!(resolver.remapper().lookup("Report"), Some("report"));
    }

    #[test]
    fn qualified_reference_overrides_unqualified() {
        let trigger = |name: &str, function: Metadata| HttpTrigger {
            metadata: Metadata::new(name),
            function,
            ..Default::default()
        };
        let state = LegacyState {
            http_triggers: vec![
                trigger("a", Metadata::new("f")),
                trigger("b", Metadata::with_uid("f", "1")),
                trigger("c", Metadata::new("f")),
                trigger("d", Metadata::with_uid("f", "2")),
            ],
            ..Default::default()
        };

        let mut resolver = Resolver::new();
        resolver.discover(&state);

        let functions: Vec<&Metadata> = resolver.logical_functions().collect();
        assert_eq!(functions, vec![&Metadata::with_uid("f", "2")]);
    }
}
