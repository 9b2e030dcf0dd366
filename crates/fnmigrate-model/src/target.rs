//! Target platform records
//!
//! Strictly named (v2) records created on the target platform. Every name in
//! these records has already been remapped.

use crate::metadata::EntityKind;
use serde::{Deserialize, Serialize};

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

/// Identity of a target record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Constraint-valid name
    pub name: String,
    /// Owning namespace
    pub namespace: String,
    /// Version assigned by the platform on creation
    #[serde(rename = "resourceVersion", default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl ObjectMeta {
    /// Metadata for a record not yet created
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            resource_version: None,
        }
    }
}

/// Common view over target records
pub trait TargetRecord {
    /// Kind of record
    const KIND: EntityKind;

    /// The record's identity
    fn metadata(&self) -> &ObjectMeta;
}

/// Reference to an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentReference {
    /// Environment name
    pub name: String,
    /// Environment namespace
    pub namespace: String,
}

/// How a trigger names its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionReferenceType {
    /// Reference by function name
    #[serde(rename = "name")]
    FunctionName,
}

/// Reference from a trigger to a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionReference {
    /// Reference flavour
    #[serde(rename = "type")]
    pub reference_type: FunctionReferenceType,
    /// Function name
    pub name: String,
}

impl FunctionReference {
    /// Reference a function by name
    #[inline]
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            reference_type: FunctionReferenceType::FunctionName,
            name: name.into(),
        }
    }
}

/// Storage flavour of a deployment archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    /// Bytes carried inline
    Literal,
    /// Bytes fetched from a URL
    Url,
}

/// Deployment archive of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    /// Storage flavour
    #[serde(rename = "type")]
    pub archive_type: ArchiveType,
    /// Inline contents, base64 on the wire
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "base64_bytes")]
    pub literal: Vec<u8>,
    /// Remote location
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl Archive {
    /// Inline archive holding `bytes`
    #[inline]
    #[must_use]
    pub fn literal(bytes: Vec<u8>) -> Self {
        Self {
            archive_type: ArchiveType::Literal,
            literal: bytes,
            url: String::new(),
        }
    }
}

/// Package contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Environment building and running the package
    pub environment: EnvironmentReference,
    /// Deployable archive
    pub deployment: Archive,
}

/// Deployment package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: PackageSpec,
}

/// Pointer to a created package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Package name
    pub name: String,
    /// Package namespace
    pub namespace: String,
    /// Version of the package the function is pinned to
    #[serde(rename = "resourceversion", default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

/// Package section of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPackageRef {
    /// Referenced package
    #[serde(rename = "packageref")]
    pub package_ref: PackageRef,
}

/// Function contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Environment the function runs in
    pub environment: EnvironmentReference,
    /// Package holding the code
    pub package: FunctionPackageRef,
}

/// Target function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: FunctionSpec,
}

/// Environment runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    /// Container image
    pub image: String,
}

/// Environment contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    /// Environment interface version
    pub version: u32,
    /// Runtime container
    pub runtime: Runtime,
}

/// Target environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: EnvironmentSpec,
}

/// HTTP trigger contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTriggerSpec {
    /// Route relative to the router root
    #[serde(rename = "relativeurl")]
    pub relative_url: String,
    /// HTTP method
    pub method: String,
    /// Invoked function
    #[serde(rename = "functionref")]
    pub function_reference: FunctionReference,
}

/// Target HTTP trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTrigger {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: HttpTriggerSpec,
}

/// Supported queue flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageQueueType {
    /// NATS streaming
    Nats,
}

/// Message-queue trigger contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageQueueTriggerSpec {
    /// Invoked function
    #[serde(rename = "functionref")]
    pub function_reference: FunctionReference,
    /// Queue flavour
    #[serde(rename = "messageQueueType")]
    pub message_queue_type: MessageQueueType,
    /// Subscribed topic
    pub topic: String,
    /// Response topic
    #[serde(rename = "respTopic")]
    pub response_topic: String,
}

/// Target message-queue trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageQueueTrigger {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: MessageQueueTriggerSpec,
}

/// Time trigger contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTriggerSpec {
    /// Cron expression
    pub cron: String,
    /// Invoked function
    #[serde(rename = "functionref")]
    pub function_reference: FunctionReference,
}

/// Target time trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTrigger {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: TimeTriggerSpec,
}

/// Watch trigger contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesWatchTriggerSpec {
    /// Watched namespace
    pub namespace: String,
    /// Watched object type
    #[serde(rename = "type")]
    pub object_type: String,
    /// Invoked function
    #[serde(rename = "functionref")]
    pub function_reference: FunctionReference,
}

/// Target watch trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesWatchTrigger {
    /// Identity
    pub metadata: ObjectMeta,
    /// Contents
    pub spec: KubernetesWatchTriggerSpec,
}

macro_rules! target_record {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl TargetRecord for $ty {
                const KIND: EntityKind = $kind;

                fn metadata(&self) -> &ObjectMeta {
                    &self.metadata
                }
            }
        )*
    };
}

target_record! {
    Environment => EntityKind::Environment,
    Package => EntityKind::Package,
    Function => EntityKind::Function,
    HttpTrigger => EntityKind::HttpTrigger,
    MessageQueueTrigger => EntityKind::MessageQueueTrigger,
    TimeTrigger => EntityKind::TimeTrigger,
    KubernetesWatchTrigger => EntityKind::Watch,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
