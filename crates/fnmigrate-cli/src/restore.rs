//! Restore
//!
//! Creates a [`MigrationPlan`] on the target platform in dependency order:
//! environments, then each function's package followed by the function,
//! then HTTP, message-queue and time triggers, then watches. The first
//! rejection stops the run; nothing already created is removed.

use crate::config::MigrateConfig;
use crate::error::{CreateError, MigrateError};
use crate::platform::{HttpPlatform, TargetPlatform};
use fnmigrate_model::{EntityKind, LegacyState, ObjectMeta, TargetRecord};
use fnmigrate_remap::{rewrite, MigrationPlan, PackageNamer, Planned, RandomPackageNamer};
use serde::Serialize;
use std::fmt::{self, Display};

/// Records created by a restore, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Environments
    pub environments: usize,
    /// Packages
    pub packages: usize,
    /// Functions
    pub functions: usize,
    /// HTTP triggers
    pub http_triggers: usize,
    /// Message-queue triggers
    pub mq_triggers: usize,
    /// Time triggers
    pub time_triggers: usize,
    /// Watches
    pub watches: usize,
}

impl RestoreReport {
    /// Total records created
    #[must_use]
    pub fn total(&self) -> usize {
        self.environments
            + self.packages
            + self.functions
            + self.http_triggers
            + self.mq_triggers
            + self.time_triggers
            + self.watches
    }

    fn count(&mut self, kind: EntityKind) {
        let slot = match kind {
            EntityKind::Environment => &mut self.environments,
            EntityKind::Package => &mut self.packages,
            EntityKind::Function => &mut self.functions,
            EntityKind::HttpTrigger => &mut self.http_triggers,
            EntityKind::MessageQueueTrigger => &mut self.mq_triggers,
            EntityKind::TimeTrigger => &mut self.time_triggers,
            EntityKind::Watch => &mut self.watches,
        };
        *slot += 1;
    }
}

impl Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {} environments, {} packages, {} functions, {} HTTP triggers, {} message queue triggers, {} time triggers, {} watches",
            self.environments,
            self.packages,
            self.functions,
            self.http_triggers,
            self.mq_triggers,
            self.time_triggers,
            self.watches
        )
    }
}

/// Create every record of `plan` on `platform`
///
/// Each function is pinned to the resource version the platform assigned to
/// its package.
///
/// # Errors
/// The first [`CreateError`]; its `created` field reports what was already
/// created.
pub fn restore<P>(plan: &MigrationPlan, platform: &mut P) -> Result<RestoreReport, CreateError>
where
    P: TargetPlatform + ?Sized,
{
    let mut report = RestoreReport::default();

    create_all(platform, &plan.environments, &mut report)?;

    for planned in &plan.functions {
        let package = create(platform, &planned.old_name, &planned.package, &mut report)?;
        let mut function = planned.function.clone();
        function.spec.package.package_ref.resource_version = package.resource_version;
        create(platform, &planned.old_name, &function, &mut report)?;
    }

    create_all(platform, &plan.http_triggers, &mut report)?;
    create_all(platform, &plan.mq_triggers, &mut report)?;
    create_all(platform, &plan.time_triggers, &mut report)?;
    create_all(platform, &plan.watches, &mut report)?;

    tracing::info!(records = report.total(), "restore complete");
    Ok(report)
}

fn create_all<P, R>(
    platform: &mut P,
    planned: &[Planned<R>],
    report: &mut RestoreReport,
) -> Result<(), CreateError>
where
    P: TargetPlatform + ?Sized,
    R: TargetRecord + Serialize,
{
    for entry in planned {
        create(platform, &entry.old_name, &entry.record, report)?;
    }
    Ok(())
}

fn create<P, R>(
    platform: &mut P,
    old_name: &str,
    record: &R,
    report: &mut RestoreReport,
) -> Result<ObjectMeta, CreateError>
where
    P: TargetPlatform + ?Sized,
    R: TargetRecord + Serialize,
{
    let new_name = &record.metadata().name;
    tracing::info!(kind = %R::KIND, old = old_name, new = %new_name, "creating {}", R::KIND);

    match platform.create(record) {
        Ok(meta) => {
            report.count(R::KIND);
            Ok(meta)
        }
        Err(source) => Err(CreateError {
            kind: R::KIND,
            old_name: old_name.to_owned(),
            new_name: new_name.clone(),
            source,
            created: *report,
        }),
    }
}

/// Load the configured snapshot and rewrite it into a plan
///
/// # Errors
/// [`MigrateError::Snapshot`] or [`MigrateError::Resolve`].
pub fn plan_from_snapshot(
    config: &MigrateConfig,
    namer: &mut dyn PackageNamer,
) -> Result<MigrationPlan, MigrateError> {
    let state = LegacyState::load(&config.snapshot_path)?;
    tracing::info!(path = %config.snapshot_path.display(), counts = %state.counts(), "loaded snapshot");
    Ok(rewrite(&state, &config.namespace, namer)?)
}

/// Plan as pretty JSON, for dry runs
///
/// # Errors
/// [`MigrateError::Encode`].
pub fn plan_json(plan: &MigrationPlan) -> Result<String, MigrateError> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Restore the configured snapshot to the configured server
///
/// # Errors
/// Any [`MigrateError`] raised on the way.
pub fn restore_to_server(config: &MigrateConfig) -> Result<RestoreReport, MigrateError> {
    let mut platform = HttpPlatform::new(config)?;
    let plan = plan_from_snapshot(config, &mut RandomPackageNamer)?;
    Ok(restore(&plan, &mut platform)?)
}
