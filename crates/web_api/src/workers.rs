use serde::Deserialize;

use crate::ApiResult;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerOptions {
    pub name: Option<String>,
    pub module: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Worker {
    pub script_url: String,
    pub options: Option<WorkerOptions>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedWorker {
    pub script_url: String,
    pub name: Option<String>,
}

/// `new Worker(..)` and `new SharedWorker(..)`.
pub trait Workers {
    fn worker(&self, script_url: &str, options: Option<&WorkerOptions>) -> ApiResult<Worker>;
    fn shared_worker(&self, script_url: &str, name: Option<&str>) -> ApiResult<SharedWorker>;
}
