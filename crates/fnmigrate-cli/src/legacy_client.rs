//! Legacy server client
//!
//! Blocking HTTP client for the legacy (v1) API. Implements the
//! [`StateSource`] and [`FunctionSource`] collaborators.

use crate::config::MigrateConfig;
use crate::error::ConfigError;
use fnmigrate_model::legacy::Function;
use fnmigrate_model::{FetchError, FunctionSource, LegacyState, StateSource};
use serde::de::DeserializeOwned;
use url::Url;

/// Client for a legacy server
#[derive(Debug, Clone)]
pub struct LegacyClient {
    base: Url,
    agent: ureq::Agent,
}

impl LegacyClient {
    /// Client for the server named in `config`
    ///
    /// # Errors
    /// The server URL is missing or unusable.
    pub fn new(config: &MigrateConfig) -> Result<Self, ConfigError> {
        let base = config.legacy_api_url()?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self { base, agent })
    }

    /// Base URL of the legacy API
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Make sure the server speaks the legacy API
    ///
    /// Newer servers answer 404 on the legacy environment listing.
    ///
    /// # Errors
    /// [`FetchError::NotLegacyServer`] on 404, [`FetchError::Transport`] when
    /// the server cannot be reached.
    pub fn ensure_legacy_server(&self) -> Result<(), FetchError> {
        let url = self.endpoint(&["environments"]);
        match self.agent.request_url("GET", &url).call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(404, _)) => Err(FetchError::NotLegacyServer {
                url: self.base.to_string(),
            }),
            Err(e) => Err(transport_error("server", e)),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Base URLs are checked to be hierarchical at construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url, what: &str) -> Result<T, FetchError> {
        let response = self
            .agent
            .request_url("GET", url)
            .call()
            .map_err(|e| transport_error(what, e))?;
        response.into_json::<T>().map_err(|e| FetchError::Decode {
            what: what.to_string(),
            message: e.to_string(),
        })
    }

    fn list<T: DeserializeOwned>(&self, segments: &[&str], what: &str) -> Result<Vec<T>, FetchError> {
        tracing::info!("getting {what}");
        let items: Option<Vec<T>> = self.get_json(&self.endpoint(segments), what)?;
        Ok(items.unwrap_or_default())
    }
}

impl StateSource for LegacyClient {
    fn fetch_state(&self) -> Result<LegacyState, FetchError> {
        let environments = self.list(&["environments"], "environments")?;
        let watches = self.list(&["watches"], "watches")?;
        let http_triggers = self.list(&["triggers", "http"], "routes")?;
        let mq_triggers = self.list(&["triggers", "messagequeue"], "message queue triggers")?;
        let time_triggers = self.list(&["triggers", "time"], "time triggers")?;
        let functions = self.list(&["functions"], "function list")?;

        Ok(LegacyState {
            functions,
            environments,
            http_triggers,
            mq_triggers,
            time_triggers,
            watches,
            name_changes: Default::default(),
        })
    }
}

impl FunctionSource for LegacyClient {
    fn fetch_function(&self, name: &str, uid: Option<&str>) -> Result<Function, FetchError> {
        let mut url = self.endpoint(&["functions", name]);
        if let Some(uid) = uid {
            url.query_pairs_mut().append_pair("uid", uid);
        }

        match self.agent.request_url("GET", &url).call() {
            Ok(response) => response.into_json::<Function>().map_err(|e| FetchError::Decode {
                what: format!("function {name}"),
                message: e.to_string(),
            }),
            Err(ureq::Error::Status(404, _)) => Err(FetchError::NotFound {
                name: name.to_string(),
                uid: uid.map(str::to_string),
            }),
            Err(e) => Err(transport_error(&format!("function {name}"), e)),
        }
    }
}

fn transport_error(what: &str, error: ureq::Error) -> FetchError {
    let message = match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            format!("status {status}: {}", body.trim())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    };
    FetchError::Transport {
        what: what.to_string(),
        message,
    }
}
