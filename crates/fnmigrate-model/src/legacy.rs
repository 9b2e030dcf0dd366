//! Legacy entity records
//!
//! Records as served by a legacy (v1) server. Names are unconstrained and
//! every cross-entity edge is a [`Metadata`] value.

use crate::metadata::{EntityKind, Metadata};
use serde::{Deserialize, Serialize};

/// Capability shared by every legacy record
///
/// Discovery walks a unified list of `&dyn LegacyEntity`, so a new record
/// kind is covered as soon as it implements this trait and is listed by
/// [`LegacyState::entities`](crate::LegacyState::entities).
pub trait LegacyEntity {
    /// Collection this record belongs to
    fn kind(&self) -> EntityKind;

    /// The record's own identity
    fn metadata(&self) -> &Metadata;

    /// Function invoked by this record, for trigger kinds
    fn function_ref(&self) -> Option<&Metadata> {
        None
    }

    /// Environment this record runs in, for functions
    fn environment_ref(&self) -> Option<&Metadata> {
        None
    }
}

/// Legacy function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Identity
    pub metadata: Metadata,
    /// Environment the function runs in
    #[serde(default)]
    pub environment: Metadata,
    /// Base64 encoded source
    #[serde(default)]
    pub code: String,
}

/// Legacy runtime environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Identity
    pub metadata: Metadata,
    /// Container image running the functions
    #[serde(rename = "runContainerImageUrl", default)]
    pub run_container_image_url: String,
}

/// Legacy HTTP trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTrigger {
    /// Identity
    pub metadata: Metadata,
    /// Route pattern
    #[serde(rename = "urlpattern", default)]
    pub url_pattern: String,
    /// HTTP method
    #[serde(default)]
    pub method: String,
    /// Invoked function
    pub function: Metadata,
}

/// Legacy message-queue trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageQueueTrigger {
    /// Identity
    pub metadata: Metadata,
    /// Invoked function
    pub function: Metadata,
    /// Queue flavour; legacy servers only spoke NATS
    #[serde(rename = "messageQueueType", default)]
    pub message_queue_type: String,
    /// Subscribed topic
    #[serde(default)]
    pub topic: String,
    /// Topic receiving the function's response
    #[serde(rename = "respTopic", default)]
    pub response_topic: String,
}

/// Legacy time trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTrigger {
    /// Identity
    pub metadata: Metadata,
    /// Cron expression
    #[serde(default)]
    pub cron: String,
    /// Invoked function
    pub function: Metadata,
}

/// Legacy Kubernetes watch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watch {
    /// Identity
    pub metadata: Metadata,
    /// Watched namespace
    #[serde(default)]
    pub namespace: String,
    /// Watched object type
    #[serde(rename = "objtype", default)]
    pub object_type: String,
    /// Label selector
    #[serde(rename = "labelselector", default)]
    pub label_selector: String,
    /// Field selector
    #[serde(rename = "fieldselector", default)]
    pub field_selector: String,
    /// Invoked function
    pub function: Metadata,
    /// Delivery target
    #[serde(default)]
    pub target: String,
}

impl LegacyEntity for Function {
    fn kind(&self) -> EntityKind {
        EntityKind::Function
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn environment_ref(&self) -> Option<&Metadata> {
        Some(&self.environment)
    }
}

impl LegacyEntity for Environment {
    fn kind(&self) -> EntityKind {
        EntityKind::Environment
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

macro_rules! trigger_entity {
    ($ty:ty, $kind:expr) => {
        impl LegacyEntity for $ty {
            fn kind(&self) -> EntityKind {
                $kind
            }

            fn metadata(&self) -> &Metadata {
                &self.metadata
            }

            fn function_ref(&self) -> Option<&Metadata> {
                Some(&self.function)
            }
        }
    };
}

trigger_entity!(HttpTrigger, EntityKind::HttpTrigger);
trigger_entity!(MessageQueueTrigger, EntityKind::MessageQueueTrigger);
trigger_entity!(TimeTrigger, EntityKind::TimeTrigger);
trigger_entity!(Watch, EntityKind::Watch);
