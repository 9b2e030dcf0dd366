//! Rewrite pass
//!
//! Builds the target records for a resolved [`LegacyState`], substituting
//! every legacy name through the snapshot's name-change table. The pass is
//! all or nothing: any integrity violation aborts it and no partial plan is
//! returned.

use crate::error::ResolveError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use fnmigrate_model::legacy;
use fnmigrate_model::target::{
    Archive, Environment, EnvironmentReference, EnvironmentSpec, Function, FunctionPackageRef,
    FunctionReference, FunctionSpec, HttpTrigger, HttpTriggerSpec, KubernetesWatchTrigger,
    KubernetesWatchTriggerSpec, MessageQueueTrigger, MessageQueueTriggerSpec, MessageQueueType,
    Package, PackageRef, PackageSpec, Runtime, TimeTrigger, TimeTriggerSpec,
};
use fnmigrate_model::{EntityKind, LegacyEntity, LegacyState, Metadata, NameChanges, ObjectMeta, TargetRecord};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Length of the random suffix appended to package names
pub const PACKAGE_SUFFIX_LEN: usize = 6;

/// Environment interface version assigned to migrated environments
pub const ENVIRONMENT_VERSION: u32 = 1;

/// Chooses the name of the package holding a function's code
pub trait PackageNamer {
    /// Package name for the function whose target name is `function`
    fn package_name(&mut self, function: &str) -> String;
}

/// `<function>-<six random lowercase alphanumerics>`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPackageNamer;

impl PackageNamer for RandomPackageNamer {
    fn package_name(&mut self, function: &str) -> String {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(PACKAGE_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        format!("{function}-{suffix}")
    }
}

/// A target record plus the legacy name it was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Planned<T> {
    /// Legacy name
    pub old_name: String,
    /// Fully renamed record
    pub record: T,
}

impl<T: TargetRecord> Planned<T> {
    /// Target name of the record
    #[inline]
    #[must_use]
    pub fn new_name(&self) -> &str {
        &self.record.metadata().name
    }
}

/// A function and the package carrying its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFunction {
    /// Legacy function name
    pub old_name: String,
    /// Package to create first
    pub package: Package,
    /// Function pointing at `package`
    pub function: Function,
}

/// Every record to create, grouped in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    /// Environments
    pub environments: Vec<Planned<Environment>>,
    /// Functions with their packages
    pub functions: Vec<PlannedFunction>,
    /// HTTP triggers
    pub http_triggers: Vec<Planned<HttpTrigger>>,
    /// Message-queue triggers
    pub mq_triggers: Vec<Planned<MessageQueueTrigger>>,
    /// Time triggers
    pub time_triggers: Vec<Planned<TimeTrigger>>,
    /// Watch triggers
    pub watches: Vec<Planned<KubernetesWatchTrigger>>,
}

impl MigrationPlan {
    /// Number of planned entries, counting a function and its package once
    #[must_use]
    pub fn len(&self) -> usize {
        self.environments.len()
            + self.functions.len()
            + self.http_triggers.len()
            + self.mq_triggers.len()
            + self.time_triggers.len()
            + self.watches.len()
    }

    /// Whether nothing is planned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Target names of every planned function
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.function.metadata.name.as_str())
    }
}

/// Build the target records for `state`
///
/// Functions sharing a legacy name are collapsed to the first one. Records
/// are placed in `namespace`.
///
/// # Errors
/// - [`ResolveError::DuplicateTarget`] if the table is not injective
/// - [`ResolveError::UnresolvedReference`] if any name lacks a table entry
/// - [`ResolveError::DanglingReference`] if a trigger's function or a
///   function's environment is not migrated
/// - [`ResolveError::InvalidCode`] if function code is not base64
pub fn rewrite(
    state: &LegacyState,
    namespace: &str,
    namer: &mut dyn PackageNamer,
) -> Result<MigrationPlan, ResolveError> {
    if let Some((first, second, target)) = state.name_changes.find_collision() {
        return Err(ResolveError::DuplicateTarget {
            first: first.to_owned(),
            second: second.to_owned(),
            target: target.to_owned(),
        });
    }

    let rewriter = Rewriter {
        changes: &state.name_changes,
        namespace,
    };
    let mut plan = MigrationPlan::default();

    let mut environments: HashSet<&str> = HashSet::with_capacity(state.environments.len());
    for environment in &state.environments {
        let name = rewriter.own_name(environment)?;
        environments.insert(environment.metadata.name.as_str());
        plan.environments.push(Planned {
            old_name: environment.metadata.name.clone(),
            record: Environment {
                metadata: rewriter.object_meta(name),
                spec: EnvironmentSpec {
                    version: ENVIRONMENT_VERSION,
                    runtime: Runtime {
                        image: environment.run_container_image_url.clone(),
                    },
                },
            },
        });
    }

    let mut functions: HashSet<&str> = HashSet::with_capacity(state.functions.len());
    for function in &state.functions {
        let old = function.metadata.name.as_str();
        if !functions.insert(old) {
            tracing::warn!(function = %function.metadata, "skipping duplicate function record");
            continue;
        }
        plan.functions
            .push(rewriter.function(function, &environments, namer)?);
    }

    for trigger in &state.http_triggers {
        let (name, function_reference) = rewriter.trigger(trigger, &trigger.function, &functions)?;
        plan.http_triggers.push(Planned {
            old_name: trigger.metadata.name.clone(),
            record: HttpTrigger {
                metadata: rewriter.object_meta(name),
                spec: HttpTriggerSpec {
                    relative_url: trigger.url_pattern.clone(),
                    method: trigger.method.clone(),
                    function_reference,
                },
            },
        });
    }

    for trigger in &state.mq_triggers {
        let (name, function_reference) = rewriter.trigger(trigger, &trigger.function, &functions)?;
        plan.mq_triggers.push(Planned {
            old_name: trigger.metadata.name.clone(),
            record: MessageQueueTrigger {
                metadata: rewriter.object_meta(name),
                spec: MessageQueueTriggerSpec {
                    function_reference,
                    // legacy servers only supported NATS
                    message_queue_type: MessageQueueType::Nats,
                    topic: trigger.topic.clone(),
                    response_topic: trigger.response_topic.clone(),
                },
            },
        });
    }

    for trigger in &state.time_triggers {
        let (name, function_reference) = rewriter.trigger(trigger, &trigger.function, &functions)?;
        plan.time_triggers.push(Planned {
            old_name: trigger.metadata.name.clone(),
            record: TimeTrigger {
                metadata: rewriter.object_meta(name),
                spec: TimeTriggerSpec {
                    cron: trigger.cron.clone(),
                    function_reference,
                },
            },
        });
    }

    for watch in &state.watches {
        let (name, function_reference) = rewriter.trigger(watch, &watch.function, &functions)?;
        plan.watches.push(Planned {
            old_name: watch.metadata.name.clone(),
            record: KubernetesWatchTrigger {
                metadata: rewriter.object_meta(name),
                spec: KubernetesWatchTriggerSpec {
                    namespace: watch.namespace.clone(),
                    object_type: watch.object_type.clone(),
                    function_reference,
                },
            },
        });
    }

    tracing::debug!(records = plan.len(), "rewrite complete");
    Ok(plan)
}

struct Rewriter<'a> {
    changes: &'a NameChanges,
    namespace: &'a str,
}

impl Rewriter<'_> {
    fn rename(
        &self,
        kind: EntityKind,
        entity: &str,
        field: &'static str,
        name: &str,
    ) -> Result<String, ResolveError> {
        self.changes
            .get(name)
            .map(str::to_owned)
            .ok_or_else(|| ResolveError::UnresolvedReference {
                kind,
                entity: entity.to_owned(),
                field,
                name: name.to_owned(),
            })
    }

    fn own_name(&self, entity: &dyn LegacyEntity) -> Result<String, ResolveError> {
        let old = &entity.metadata().name;
        self.rename(entity.kind(), old, "metadata.name", old)
    }

    fn object_meta(&self, name: String) -> ObjectMeta {
        ObjectMeta::new(name, self.namespace)
    }

    fn function(
        &self,
        function: &legacy::Function,
        environments: &HashSet<&str>,
        namer: &mut dyn PackageNamer,
    ) -> Result<PlannedFunction, ResolveError> {
        let old = &function.metadata.name;
        let name = self.own_name(function)?;

        let environment_old = &function.environment.name;
        let environment_name = self.rename(EntityKind::Function, old, "environment", environment_old)?;
        if !environments.contains(environment_old.as_str()) {
            return Err(ResolveError::DanglingReference {
                kind: EntityKind::Function,
                entity: old.clone(),
                target_kind: EntityKind::Environment,
                target: environment_old.clone(),
            });
        }

        let code = STANDARD
            .decode(function.code.as_bytes())
            .map_err(|source| ResolveError::InvalidCode {
                function: old.clone(),
                source,
            })?;

        let package_name = namer.package_name(&name);
        let environment = EnvironmentReference {
            name: environment_name,
            namespace: self.namespace.to_owned(),
        };

        Ok(PlannedFunction {
            old_name: old.clone(),
            package: Package {
                metadata: self.object_meta(package_name.clone()),
                spec: PackageSpec {
                    environment: environment.clone(),
                    deployment: Archive::literal(code),
                },
            },
            function: Function {
                metadata: self.object_meta(name),
                spec: FunctionSpec {
                    environment,
                    package: FunctionPackageRef {
                        package_ref: PackageRef {
                            name: package_name,
                            namespace: self.namespace.to_owned(),
                            resource_version: None,
                        },
                    },
                },
            },
        })
    }

    fn trigger(
        &self,
        trigger: &dyn LegacyEntity,
        function: &Metadata,
        functions: &HashSet<&str>,
    ) -> Result<(String, FunctionReference), ResolveError> {
        let kind = trigger.kind();
        let old = &trigger.metadata().name;
        let name = self.own_name(trigger)?;
        let function_name = self.rename(kind, old, "function", &function.name)?;
        if !functions.contains(function.name.as_str()) {
            return Err(ResolveError::DanglingReference {
                kind,
                entity: old.clone(),
                target_kind: EntityKind::Function,
                target: function.name.clone(),
            });
        }
        Ok((name, FunctionReference::by_name(function_name)))
    }
}
