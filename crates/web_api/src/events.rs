use html::Id;
use serde::Deserialize;

use crate::ApiResult;

/// Anything a listener can be registered on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTarget {
    Window,
    Document,
    Element { id: Id, local_name: String },
}

impl EventTarget {
    /// Tag name of element targets; window and document have none.
    pub fn local_name(&self) -> Option<&str> {
        match self {
            EventTarget::Element { local_name, .. } => Some(local_name),
            EventTarget::Window | EventTarget::Document => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The generic `EventTarget.prototype.addEventListener` primitive.
pub trait EventTargets {
    fn add_event_listener(
        &self,
        target: &EventTarget,
        event_type: &str,
        options: &ListenerOptions,
    ) -> ApiResult<ListenerId>;
}
