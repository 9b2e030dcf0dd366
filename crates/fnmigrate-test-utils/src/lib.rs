//! Testing utilities for fnmigrate workspace
//!
//! Shared fixtures: record builders, a sample legacy server, and an
//! in-memory implementation of the legacy collaborators.

#![allow(missing_docs)]

use fnmigrate_model::legacy::{Environment, Function, HttpTrigger, MessageQueueTrigger, TimeTrigger, Watch};
use fnmigrate_model::{FetchError, FunctionSource, LegacyState, Metadata, StateSource};
use std::cell::RefCell;

pub const HELLO_V1_CODE: &str = "bW9kdWxlLmV4cG9ydHMgPSAoKSA9PiAndjEn";
pub const HELLO_V2_CODE: &str = "bW9kdWxlLmV4cG9ydHMgPSAoKSA9PiAndjIn";
pub const GREETER_CODE: &str = "ZGVmIG1haW4oKTogcmV0dXJuICdoaSc=";
pub const REPORT_CODE: &str = "ZGVmIG1haW4oKTogcmV0dXJuICdyZXBvcnQn";

pub fn meta(name: &str) -> Metadata {
    Metadata::new(name)
}

pub fn meta_uid(name: &str, uid: &str) -> Metadata {
    Metadata::with_uid(name, uid)
}

pub fn function(metadata: Metadata, environment: &str, code: &str) -> Function {
    Function {
        metadata,
        environment: meta(environment),
        code: code.to_string(),
    }
}

pub fn environment(name: &str, image: &str) -> Environment {
    Environment {
        metadata: meta(name),
        run_container_image_url: image.to_string(),
    }
}

pub fn http_trigger(name: &str, url: &str, function: Metadata) -> HttpTrigger {
    HttpTrigger {
        metadata: meta(name),
        url_pattern: url.to_string(),
        method: "GET".to_string(),
        function,
    }
}

pub fn mq_trigger(name: &str, topic: &str, function: Metadata) -> MessageQueueTrigger {
    MessageQueueTrigger {
        metadata: meta(name),
        function,
        message_queue_type: "nats-streaming".to_string(),
        topic: topic.to_string(),
        response_topic: format!("{topic}.response"),
    }
}

pub fn time_trigger(name: &str, cron: &str, function: Metadata) -> TimeTrigger {
    TimeTrigger {
        metadata: meta(name),
        cron: cron.to_string(),
        function,
    }
}

pub fn watch(name: &str, object_type: &str, function: Metadata) -> Watch {
    Watch {
        metadata: meta(name),
        namespace: "default".to_string(),
        object_type: object_type.to_string(),
        label_selector: String::new(),
        field_selector: String::new(),
        function,
        target: String::new(),
    }
}

/// Legacy state as listed by the sample server
///
/// `Hello_World` is referenced at two uids, `Report_Gen` only through a time
/// trigger, and most names break the target naming rules.
pub fn sample_listing() -> LegacyState {
    LegacyState {
        functions: vec![
            function(meta_uid("Hello_World", "v2"), "Node JS", HELLO_V2_CODE),
            function(meta_uid("greeter", "g1"), "python3", GREETER_CODE),
        ],
        environments: vec![
            environment("Node JS", "fission/node-env"),
            environment("python3", "fission/python-env"),
        ],
        http_triggers: vec![
            http_trigger("hello_route", "/hello", meta_uid("Hello_World", "v1")),
            http_trigger("Greeter-Route", "/greet", meta("greeter")),
        ],
        mq_triggers: vec![mq_trigger("orders!", "orders", meta_uid("Hello_World", "v2"))],
        time_triggers: vec![time_trigger("nightly report", "0 3 * * *", meta_uid("Report_Gen", "r1"))],
        watches: vec![watch("pod_watch", "pod", meta_uid("greeter", "g1"))],
        name_changes: Default::default(),
    }
}

/// Every function version the sample server can serve
pub fn sample_function_versions() -> Vec<Function> {
    vec![
        function(meta_uid("Hello_World", "v1"), "Node JS", HELLO_V1_CODE),
        function(meta_uid("Hello_World", "v2"), "Node JS", HELLO_V2_CODE),
        function(meta_uid("greeter", "g1"), "python3", GREETER_CODE),
        function(meta_uid("Report_Gen", "r1"), "python3", REPORT_CODE),
    ]
}

/// In-memory legacy server
///
/// Serves a fixed listing and resolves function fetches against a set of
/// versions; an unqualified fetch returns the last version with that name.
#[derive(Debug, Default)]
pub struct InMemoryLegacyServer {
    pub listing: LegacyState,
    pub versions: Vec<Function>,
    fetches: RefCell<Vec<Metadata>>,
}

impl InMemoryLegacyServer {
    pub fn new(listing: LegacyState, versions: Vec<Function>) -> Self {
        Self {
            listing,
            versions,
            fetches: RefCell::new(Vec::new()),
        }
    }

    pub fn sample() -> Self {
        Self::new(sample_listing(), sample_function_versions())
    }

    /// Function fetches served so far, in order
    pub fn fetches(&self) -> Vec<Metadata> {
        self.fetches.borrow().clone()
    }
}

impl StateSource for InMemoryLegacyServer {
    fn fetch_state(&self) -> Result<LegacyState, FetchError> {
        Ok(self.listing.clone())
    }
}

impl FunctionSource for InMemoryLegacyServer {
    fn fetch_function(&self, name: &str, uid: Option<&str>) -> Result<Function, FetchError> {
        self.fetches.borrow_mut().push(Metadata {
            name: name.to_string(),
            uid: uid.map(str::to_string),
        });
        self.versions
            .iter()
            .rev()
            .find(|f| f.metadata.name == name && (uid.is_none() || f.metadata.uid() == uid))
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                name: name.to_string(),
                uid: uid.map(str::to_string),
            })
    }
}
