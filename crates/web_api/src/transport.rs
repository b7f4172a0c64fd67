use serde::Deserialize;

use crate::ApiResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebSocket {
    pub url: String,
    /// Protocol list exactly as the constructor received it.
    pub requested_protocols: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventSourceInit {
    pub with_credentials: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventSource {
    pub url: String,
    pub with_credentials: bool,
}

/// Realtime transport constructors: `new WebSocket(..)` and `new EventSource(..)`.
pub trait RealtimeTransports {
    fn web_socket(&self, url: &str, protocols: Option<&[String]>) -> ApiResult<WebSocket>;
    fn event_source(&self, url: &str, init: Option<&EventSourceInit>) -> ApiResult<EventSource>;
}
