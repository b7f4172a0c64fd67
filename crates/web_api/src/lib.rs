//! # web_api
//!
//! The platform surface a monitored page talks to, expressed as traits so
//! that any implementation (the in-memory [`sim`] one, or a real engine
//! binding) can be observed through a decorator without the page noticing.
//!
//! Every fallible entry point returns [`ApiResult`]; an `Err` stands for the
//! exception the page's caller would see.

mod appcache;
mod canvas;
mod error;
mod events;
mod geolocation;
mod media;
mod platform;
mod rtc;
mod storage;
mod transport;
mod workers;

pub mod sim;

pub use appcache::{ApplicationCache, CacheStatus};
pub use canvas::{Canvas, ContextOptions, RenderingContext};
pub use error::{ApiResult, DomException};
pub use events::{EventTarget, EventTargets, ListenerId, ListenerOptions};
pub use geolocation::{Geolocation, Position, PositionOptions, WatchId};
pub use media::{MediaConstraints, MediaDevices, MediaSource, MediaSources, MediaStream, ReadyState};
pub use platform::{Platform, Window, has_opaque_origin};
pub use rtc::{
    PeerConnection, PeerConnections, RtcConfiguration, SdpType, SessionDescription,
    SessionDescriptionInit,
};
pub use storage::{Storage, StorageSlot};
pub use transport::{EventSource, EventSourceInit, RealtimeTransports, WebSocket};
pub use workers::{SharedWorker, Worker, WorkerOptions, Workers};
