use instrument::StorageArea;
use serde::Deserialize;
use web_api::{
    ContextOptions, EventSourceInit, ListenerOptions, MediaConstraints, PositionOptions,
    RtcConfiguration, SessionDescriptionInit, WorkerOptions,
};

/// One step of a page script. Each maps onto a platform call the page
/// would make, so every step goes through whatever wraps the platform.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    GetCurrentPosition {
        #[serde(default)]
        options: PositionOptions,
    },
    WatchPosition {
        #[serde(default)]
        options: PositionOptions,
    },
    ClearWatch {
        id: u32,
    },
    AppCacheUpdate,
    AppCacheAbort,
    AppCacheSwapCache,
    WebSocket {
        url: String,
        protocols: Option<Vec<String>>,
    },
    EventSource {
        url: String,
        init: Option<EventSourceInit>,
    },
    Worker {
        url: String,
        options: Option<WorkerOptions>,
    },
    SharedWorker {
        url: String,
        name: Option<String>,
    },
    GetUserMedia {
        #[serde(default)]
        constraints: MediaConstraints,
    },
    SessionDescription {
        init: Option<SessionDescriptionInit>,
    },
    PeerConnection {
        configuration: Option<RtcConfiguration>,
    },
    MediaSource,
    /// `getContext` on every canvas matched by `selector`.
    GetContext {
        #[serde(default = "canvas_selector")]
        selector: String,
        context_id: String,
        options: Option<ContextOptions>,
    },
    AddEventListener {
        target: ListenerTarget,
        event: String,
        #[serde(default)]
        options: ListenerOptions,
    },
    SetItem {
        area: StorageArea,
        key: String,
        value: String,
    },
    RemoveItem {
        area: StorageArea,
        key: String,
    },
    ClearStorage {
        area: StorageArea,
    },
    RemoveElements {
        selector: String,
    },
}

fn canvas_selector() -> String {
    "canvas".to_string()
}

/// `"window"`, `"document"`, or a selector naming the target elements.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ListenerTarget {
    Window,
    Document,
    Elements(String),
}

impl From<String> for ListenerTarget {
    fn from(value: String) -> Self {
        match value.as_str() {
            "window" => ListenerTarget::Window,
            "document" => ListenerTarget::Document,
            _ => ListenerTarget::Elements(value),
        }
    }
}
