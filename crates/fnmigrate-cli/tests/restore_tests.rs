use fnmigrate_cli::{plan_from_snapshot, restore, MigrateConfig, PlatformError, RestoreReport, TargetPlatform};
use fnmigrate_model::{EntityKind, LegacyState, ObjectMeta, TargetRecord};
use fnmigrate_remap::{resolve_snapshot, rewrite, MigrationPlan, PackageNamer};
use fnmigrate_test_utils::InMemoryLegacyServer;
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::Value;

struct SuffixNamer;

impl PackageNamer for SuffixNamer {
    fn package_name(&mut self, function: &str) -> String {
        format!("{function}-abc123")
    }
}

/// Accepts everything, remembering what it was sent
#[derive(Default)]
struct RecordingPlatform {
    created: Vec<(EntityKind, String, Value)>,
    reject: Option<String>,
}

impl RecordingPlatform {
    fn rejecting(name: &str) -> Self {
        Self {
            reject: Some(name.to_string()),
            ..Self::default()
        }
    }

    fn order(&self) -> Vec<(EntityKind, &str)> {
        self.created.iter().map(|(kind, name, _)| (*kind, name.as_str())).collect()
    }

    fn record(&self, name: &str) -> &Value {
        &self.created.iter().find(|(_, n, _)| n == name).unwrap().2
    }
}

impl TargetPlatform for RecordingPlatform {
    fn create<R>(&mut self, record: &R) -> Result<ObjectMeta, PlatformError>
    where
        R: TargetRecord + Serialize,
    {
        let meta = record.metadata();
        if self.reject.as_deref() == Some(meta.name.as_str()) {
            return Err(PlatformError::Conflict {
                message: format!("{} already exists", meta.name),
            });
        }
        self.created
            .push((R::KIND, meta.name.clone(), serde_json::to_value(record).unwrap()));
        Ok(ObjectMeta {
            resource_version: Some(format!("rv-{}", self.created.len())),
            ..meta.clone()
        })
    }
}

fn sample_plan() -> MigrationPlan {
    let server = InMemoryLegacyServer::sample();
    let state = resolve_snapshot(server.listing.clone(), &server).unwrap();
    rewrite(&state, "default", &mut SuffixNamer).unwrap()
}

#[test]
fn entities_are_created_in_dependency_order() {
    let mut platform = RecordingPlatform::default();
    let report = restore(&sample_plan(), &mut platform).unwrap();

    assert_eq!(
        platform.order(),
        vec![
            (EntityKind::Environment, "node-js"),
            (EntityKind::Environment, "python3"),
            (EntityKind::Package, "hello-world-abc123"),
            (EntityKind::Function, "hello-world"),
            (EntityKind::Package, "greeter-abc123"),
            (EntityKind::Function, "greeter"),
            (EntityKind::Package, "report-gen-abc123"),
            (EntityKind::Function, "report-gen"),
            (EntityKind::HttpTrigger, "hello-route"),
            (EntityKind::HttpTrigger, "greeter-route"),
            (EntityKind::MessageQueueTrigger, "orders"),
            (EntityKind::TimeTrigger, "nightly-report"),
            (EntityKind::Watch, "pod-watch"),
        ]
    );
    assert_eq!(
        report,
        RestoreReport {
            environments: 2,
            packages: 3,
            functions: 3,
            http_triggers: 2,
            mq_triggers: 1,
            time_triggers: 1,
            watches: 1,
        }
    );
    assert_eq!(report.total(), 13);
}

#[test]
fn functions_are_pinned_to_their_created_package() {
    let mut platform = RecordingPlatform::default();
    restore(&sample_plan(), &mut platform).unwrap();

    // hello-world-abc123 is the third record created
    let function = platform.record("hello-world");
    assert_eq!(
        function["spec"]["package"]["packageref"],
        serde_json::json!({
            "name": "hello-world-abc123",
            "namespace": "default",
            "resourceversion": "rv-3",
        })
    );
    assert_eq!(function["spec"]["environment"]["name"], "node-js");
}

#[test]
fn triggers_reference_functions_by_new_name() {
    let mut platform = RecordingPlatform::default();
    restore(&sample_plan(), &mut platform).unwrap();

    let route = platform.record("hello-route");
    assert_eq!(route["spec"]["functionref"], serde_json::json!({"type": "name", "name": "hello-world"}));
    assert_eq!(platform.record("orders")["spec"]["messageQueueType"], "nats");
}

#[test]
fn rejection_stops_the_run_and_reports_progress() {
    let mut platform = RecordingPlatform::rejecting("greeter");
    let err = restore(&sample_plan(), &mut platform).unwrap_err();

    assert_eq!(err.kind, EntityKind::Function);
    assert_eq!(err.old_name, "greeter");
    assert_eq!(err.new_name, "greeter");
    assert!(matches!(err.source, PlatformError::Conflict { .. }));
    assert_eq!(err.created.environments, 2);
    assert_eq!(err.created.packages, 2);
    assert_eq!(err.created.functions, 1);
    assert_eq!(err.created.total(), 5);

    // nothing after the failure was attempted
    assert_eq!(platform.created.len(), 5);
    assert!(err.to_string().contains("legacy name 'greeter'"));
}

#[test]
fn plan_is_built_from_the_snapshot_file() {
    let server = InMemoryLegacyServer::sample();
    let state = resolve_snapshot(server.listing.clone(), &server).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    state.save(&path).unwrap();

    let config = MigrateConfig::new()
        .with_snapshot_path(&path)
        .with_namespace("migrated");
    let plan = plan_from_snapshot(&config, &mut SuffixNamer).unwrap();

    assert_eq!(plan.len(), 10);
    assert!(plan.environments.iter().all(|e| e.record.metadata.namespace == "migrated"));
    assert_eq!(LegacyState::load(&path).unwrap(), state);
}
