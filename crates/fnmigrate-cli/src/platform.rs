//! Target platform
//!
//! The creation API of the new platform, behind a trait so restores can be
//! run against a recording double in tests.

use crate::config::MigrateConfig;
use crate::error::{ConfigError, PlatformError};
use fnmigrate_model::{EntityKind, ObjectMeta, TargetRecord};
use serde::Serialize;
use url::Url;

/// Creates records on the target platform
pub trait TargetPlatform {
    /// Create `record`, returning the metadata the platform assigned
    ///
    /// # Errors
    /// Whatever the platform rejected the record with.
    fn create<R>(&mut self, record: &R) -> Result<ObjectMeta, PlatformError>
    where
        R: TargetRecord + Serialize;
}

/// Collection path of a record kind under the target API
#[must_use]
pub fn collection(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Environment => &["environments"],
        EntityKind::Package => &["packages"],
        EntityKind::Function => &["functions"],
        EntityKind::HttpTrigger => &["triggers", "http"],
        EntityKind::MessageQueueTrigger => &["triggers", "messagequeue"],
        EntityKind::TimeTrigger => &["triggers", "time"],
        EntityKind::Watch => &["watches"],
    }
}

/// Target platform reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    base: Url,
    agent: ureq::Agent,
}

impl HttpPlatform {
    /// Platform client for the server named in `config`
    ///
    /// # Errors
    /// The server URL is missing or unusable.
    pub fn new(config: &MigrateConfig) -> Result<Self, ConfigError> {
        let base = config.target_api_url()?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self { base, agent })
    }

    fn endpoint(&self, kind: EntityKind) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(collection(kind));
        }
        url
    }
}

impl TargetPlatform for HttpPlatform {
    fn create<R>(&mut self, record: &R) -> Result<ObjectMeta, PlatformError>
    where
        R: TargetRecord + Serialize,
    {
        let url = self.endpoint(R::KIND);
        tracing::debug!(kind = %R::KIND, name = %record.metadata().name, %url, "posting record");

        match self.agent.request_url("POST", &url).send_json(record) {
            Ok(response) => response
                .into_json::<ObjectMeta>()
                .map_err(|e| PlatformError::Decode(e.to_string())),
            Err(ureq::Error::Status(status, response)) => {
                let message = response.into_string().unwrap_or_default().trim().to_string();
                Err(status_error(status, message))
            }
            Err(ureq::Error::Transport(transport)) => Err(PlatformError::Transport(transport.to_string())),
        }
    }
}

fn status_error(status: u16, message: String) -> PlatformError {
    match status {
        409 => PlatformError::Conflict { message },
        400 | 422 => PlatformError::Validation { message },
        _ => PlatformError::Api { status, message },
    }
}
