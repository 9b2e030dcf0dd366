use fnmigrate_model::{EntityKind, FetchError, LegacyState, NameChanges};
use fnmigrate_remap::prelude::*;
use fnmigrate_test_utils::{
    environment, function, http_trigger, meta, meta_uid, time_trigger, InMemoryLegacyServer,
    HELLO_V2_CODE,
};
use pretty_assertions::assert_eq;

struct SuffixNamer;

impl PackageNamer for SuffixNamer {
    fn package_name(&mut self, function: &str) -> String {
        format!("{function}-abc123")
    }
}

fn resolved_sample() -> (InMemoryLegacyServer, LegacyState) {
    let server = InMemoryLegacyServer::sample();
    let listing = server.listing.clone();
    let state = resolve_snapshot(listing, &server).unwrap();
    (server, state)
}

#[test]
fn sample_snapshot_name_changes() {
    let (_, state) = resolved_sample();
    let entries: Vec<(&str, &str)> = state.name_changes.iter().collect();
    assert_eq!(
        entries,
        vec![
            ("Hello_World", "hello-world"),
            ("greeter", "greeter"),
            ("hello_route", "hello-route"),
            ("Greeter-Route", "greeter-route"),
            ("orders!", "orders"),
            ("pod_watch", "pod-watch"),
            ("nightly report", "nightly-report"),
            ("Node JS", "node-js"),
            ("python3", "python3"),
            ("Report_Gen", "report-gen"),
        ]
    );
}

#[test]
fn referenced_functions_are_fetched_once_per_name() {
    let (server, state) = resolved_sample();

    assert_eq!(
        server.fetches(),
        vec![
            meta_uid("Hello_World", "v2"),
            meta_uid("greeter", "g1"),
            meta_uid("Report_Gen", "r1"),
        ]
    );

    let names: Vec<&str> = state.functions.iter().map(|f| f.metadata.name.as_str()).collect();
    assert_eq!(names, vec!["Hello_World", "greeter", "Report_Gen"]);
    assert_eq!(state.functions[0].code, HELLO_V2_CODE);
}

#[test]
fn two_uids_of_one_name_collapse_to_one_function() {
    let listing = LegacyState {
        environments: vec![environment("env", "img")],
        http_triggers: vec![
            http_trigger("first", "/a", meta_uid("Worker", "1")),
            http_trigger("second", "/b", meta_uid("Worker", "2")),
        ],
        ..Default::default()
    };
    let server = InMemoryLegacyServer::new(
        listing.clone(),
        vec![
            function(meta_uid("Worker", "1"), "env", ""),
            function(meta_uid("Worker", "2"), "env", ""),
        ],
    );

    let state = resolve_snapshot(listing, &server).unwrap();
    assert_eq!(state.functions.len(), 1);

    let plan = rewrite(&state, "default", &mut SuffixNamer).unwrap();
    assert_eq!(plan.function_names().collect::<Vec<_>>(), vec!["worker"]);
    assert!(plan
        .http_triggers
        .iter()
        .all(|t| t.record.spec.function_reference.name == "worker"));
}

#[test]
fn every_trigger_points_at_exactly_one_planned_function() {
    let (_, state) = resolved_sample();
    let plan = rewrite(&state, "default", &mut SuffixNamer).unwrap();
    let functions: Vec<&str> = plan.function_names().collect();

    let mut references: Vec<(&str, &str)> = Vec::new();
    references.extend(state.http_triggers.iter().zip(&plan.http_triggers).map(|(old, new)| {
        (old.function.name.as_str(), new.record.spec.function_reference.name.as_str())
    }));
    references.extend(state.mq_triggers.iter().zip(&plan.mq_triggers).map(|(old, new)| {
        (old.function.name.as_str(), new.record.spec.function_reference.name.as_str())
    }));
    references.extend(state.time_triggers.iter().zip(&plan.time_triggers).map(|(old, new)| {
        (old.function.name.as_str(), new.record.spec.function_reference.name.as_str())
    }));
    references.extend(state.watches.iter().zip(&plan.watches).map(|(old, new)| {
        (old.function.name.as_str(), new.record.spec.function_reference.name.as_str())
    }));

    assert_eq!(references.len(), 5);
    for (old, new) in references {
        assert_eq!(state.name_changes.get(old), Some(new));
        assert_eq!(functions.iter().filter(|f| **f == new).count(), 1, "{new}");
    }
}

#[test]
fn plan_records_carry_renamed_identities() {
    let (_, state) = resolved_sample();
    let plan = rewrite(&state, "migrated", &mut SuffixNamer).unwrap();

    assert_eq!(plan.len(), 2 + 3 + 2 + 1 + 1 + 1);
    assert_eq!(plan.environments[0].new_name(), "node-js");
    assert_eq!(plan.environments[0].record.spec.runtime.image, "fission/node-env");

    let hello = &plan.functions[0];
    assert_eq!(hello.old_name, "Hello_World");
    assert_eq!(hello.package.metadata.name, "hello-world-abc123");
    assert_eq!(hello.package.metadata.namespace, "migrated");
    assert_eq!(hello.function.spec.environment.name, "node-js");
    assert_eq!(hello.package.spec.deployment.literal, b"module.exports = () => 'v2'");

    assert_eq!(plan.mq_triggers[0].new_name(), "orders");
    assert_eq!(plan.mq_triggers[0].record.spec.response_topic, "orders.response");
    assert_eq!(plan.time_triggers[0].record.spec.function_reference.name, "report-gen");
    assert_eq!(plan.watches[0].record.spec.object_type, "pod");
}

#[test]
fn missing_function_aborts_resolution() {
    let listing = LegacyState {
        time_triggers: vec![time_trigger("cleanup", "@hourly", meta("Ghost"))],
        ..Default::default()
    };
    let server = InMemoryLegacyServer::new(listing.clone(), Vec::new());

    let err = resolve_snapshot(listing, &server).unwrap_err();
    assert!(matches!(err, FetchError::NotFound { ref name, uid: None } if name == "Ghost"));
}

#[test]
fn name_without_table_entry_is_unresolved() {
    let (_, state) = resolved_sample();
    let state = without_entry(state, "pod_watch");

    let err = rewrite(&state, "default", &mut SuffixNamer).unwrap_err();
    match err {
        ResolveError::UnresolvedReference { kind, entity, field, name } => {
            assert_eq!(kind, EntityKind::Watch);
            assert_eq!(entity, "pod_watch");
            assert_eq!(field, "metadata.name");
            assert_eq!(name, "pod_watch");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn valid_environment_keeps_its_name_over_a_colliding_reference() {
    let listing = LegacyState {
        functions: vec![function(meta("hello"), "Python!", "")],
        environments: vec![environment("python", "img"), environment("Python!", "img")],
        ..Default::default()
    };

    let mut resolver = Resolver::new();
    resolver.discover(&listing);
    let changes = resolver.finish();

    assert_eq!(changes.get("python"), Some("python"));
    assert_eq!(changes.get("Python!"), Some("python-1"));
    assert_eq!(changes.get("hello"), Some("hello"));
}

fn without_entry(mut state: LegacyState, removed: &str) -> LegacyState {
    state.name_changes = state
        .name_changes
        .iter()
        .filter(|(old, _)| *old != removed)
        .map(|(old, new)| (old.to_owned(), new.to_owned()))
        .collect::<NameChanges>();
    state
}

#[test]
fn trigger_function_without_table_entry_is_unresolved() {
    let (_, state) = resolved_sample();
    let mut state = without_entry(state, "Report_Gen");
    // the function's own entry would be reported first
    state.functions.retain(|f| f.metadata.name != "Report_Gen");

    let err = rewrite(&state, "default", &mut SuffixNamer).unwrap_err();
    match err {
        ResolveError::UnresolvedReference { kind, entity, field, name } => {
            assert_eq!(kind, EntityKind::TimeTrigger);
            assert_eq!(entity, "nightly report");
            assert_eq!(field, "function");
            assert_eq!(name, "Report_Gen");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn function_environment_without_table_entry_is_unresolved() {
    let (_, state) = resolved_sample();
    let mut state = without_entry(state, "python3");
    state.environments.retain(|e| e.metadata.name != "python3");

    let err = rewrite(&state, "default", &mut SuffixNamer).unwrap_err();
    match err {
        ResolveError::UnresolvedReference { kind, entity, field, name } => {
            assert_eq!(kind, EntityKind::Function);
            assert_eq!(entity, "greeter");
            assert_eq!(field, "environment");
            assert_eq!(name, "python3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn trigger_for_unmigrated_function_is_dangling() {
    let (_, mut state) = resolved_sample();
    state.functions.retain(|f| f.metadata.name != "Report_Gen");

    let err = rewrite(&state, "default", &mut SuffixNamer).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::DanglingReference { kind: EntityKind::TimeTrigger, target_kind: EntityKind::Function, ref target, .. }
            if target == "Report_Gen"
    ));
}

#[test]
fn function_for_unmigrated_environment_is_dangling() {
    let (_, mut state) = resolved_sample();
    state.environments.retain(|e| e.metadata.name != "python3");

    let err = rewrite(&state, "default", &mut SuffixNamer).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::DanglingReference { kind: EntityKind::Function, target_kind: EntityKind::Environment, .. }
    ));
}

#[test]
fn resolved_snapshot_round_trips_through_json() {
    let (_, state) = resolved_sample();
    let bytes = state.to_pretty_json().unwrap();
    let restored = LegacyState::from_slice(&bytes).unwrap();
    assert_eq!(state, restored);

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["namechanges"]["orders!"], "orders");
}
