//! Deterministic in-memory implementations of every platform entry point.
//!
//! They behave enough like a browser for audits and tests: permissions can be
//! denied, canvases bind to one context type, storage can be unavailable. Every
//! raw invocation is appended to an [`ApiCallLog`] so callers can check what
//! actually reached the platform.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use html::Id;
use serde::Deserialize;
use url::Url;

use crate::{
    ApiResult, ApplicationCache, CacheStatus, Canvas, ContextOptions, DomException, EventSource,
    EventSourceInit, EventTarget, EventTargets, Geolocation, ListenerId, ListenerOptions,
    MediaConstraints, MediaDevices, MediaSource, MediaSources, MediaStream, PeerConnection,
    PeerConnections, Platform, Position, PositionOptions, ReadyState, RealtimeTransports,
    RenderingContext, RtcConfiguration, SessionDescription, SessionDescriptionInit, SharedWorker,
    Storage, StorageSlot, WatchId, WebSocket, Worker, WorkerOptions, Workers, has_opaque_origin,
};

/// One call as received by the underlying platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCall {
    pub api: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, Default)]
pub struct ApiCallLog(Rc<RefCell<Vec<RawCall>>>);

impl ApiCallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, api: &'static str, detail: impl Into<String>) {
        self.0.borrow_mut().push(RawCall {
            api,
            detail: detail.into(),
        });
    }

    pub fn calls(&self) -> Vec<RawCall> {
        self.0.borrow().clone()
    }

    pub fn count(&self, api: &str) -> usize {
        self.0.borrow().iter().filter(|c| c.api == api).count()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Granted,
    Denied,
}

/// Knobs for the simulated platform; plain data so it can cross threads.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub geolocation: Permission,
    pub media_capture: Permission,
    pub position: (f64, f64),
    /// Forces storage off even for tuple origins.
    pub storage_disabled: bool,
    pub local_storage: BTreeMap<String, String>,
    pub session_storage: BTreeMap<String, String>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            geolocation: Permission::Granted,
            media_capture: Permission::Granted,
            position: (52.37, 4.89),
            storage_disabled: false,
            local_storage: BTreeMap::new(),
            session_storage: BTreeMap::new(),
        }
    }
}

/// Builds a full [`Platform`] backed by the simulated implementations.
///
/// Storage is denied for opaque origins, mirroring browsers that throw a
/// `SecurityError` when a `data:` document touches `localStorage`.
pub fn platform(url: &Url, settings: &SimSettings, log: &ApiCallLog) -> Platform {
    let storage_slot = |initial: &BTreeMap<String, String>| {
        if settings.storage_disabled || has_opaque_origin(url) {
            StorageSlot::Denied(DomException::security(format!(
                "Storage is disabled for {}",
                url.scheme()
            )))
        } else {
            StorageSlot::Available(Box::new(MemoryStorage::with_items(initial.clone())))
        }
    };

    Platform {
        geolocation: Box::new(SimGeolocation {
            log: log.clone(),
            permission: settings.geolocation,
            position: settings.position,
            next_watch: Cell::new(1),
        }),
        application_cache: Box::new(SimApplicationCache {
            log: log.clone(),
            status: Cell::new(CacheStatus::Uncached),
        }),
        transports: Box::new(SimTransports { log: log.clone() }),
        workers: Box::new(SimWorkers { log: log.clone() }),
        media_devices: Box::new(SimMediaDevices {
            log: log.clone(),
            permission: settings.media_capture,
            next_stream: Cell::new(1),
        }),
        peer_connections: Box::new(SimPeerConnections { log: log.clone() }),
        media_sources: Box::new(SimMediaSources { log: log.clone() }),
        canvas: Box::new(SimCanvas {
            log: log.clone(),
            bound: RefCell::new(HashMap::new()),
        }),
        events: Box::new(SimEventTargets {
            log: log.clone(),
            next: Cell::new(1),
        }),
        local_storage: storage_slot(&settings.local_storage),
        session_storage: storage_slot(&settings.session_storage),
    }
}

struct SimGeolocation {
    log: ApiCallLog,
    permission: Permission,
    position: (f64, f64),
    next_watch: Cell<u32>,
}

impl SimGeolocation {
    fn check(&self) -> ApiResult<()> {
        match self.permission {
            Permission::Granted => Ok(()),
            Permission::Denied => Err(DomException::not_allowed("User denied Geolocation")),
        }
    }
}

impl Geolocation for SimGeolocation {
    fn get_current_position(&self, options: &PositionOptions) -> ApiResult<Position> {
        self.log.push("getCurrentPosition", format!("{options:?}"));
        self.check()?;
        Ok(Position {
            latitude: self.position.0,
            longitude: self.position.1,
            accuracy: if options.enable_high_accuracy { 5.0 } else { 50.0 },
            timestamp_ms: 0,
        })
    }

    fn watch_position(&self, options: &PositionOptions) -> ApiResult<WatchId> {
        self.log.push("watchPosition", format!("{options:?}"));
        self.check()?;
        let id = self.next_watch.get();
        self.next_watch.set(id + 1);
        Ok(WatchId(id))
    }

    fn clear_watch(&self, id: WatchId) {
        self.log.push("clearWatch", id.0.to_string());
    }
}

struct SimApplicationCache {
    log: ApiCallLog,
    status: Cell<CacheStatus>,
}

impl ApplicationCache for SimApplicationCache {
    fn update(&self) -> ApiResult<()> {
        self.log.push("applicationCache.update", "");
        match self.status.get() {
            CacheStatus::Uncached | CacheStatus::Obsolete => Err(DomException::invalid_state(
                "there is no application cache to update",
            )),
            _ => Ok(()),
        }
    }

    fn abort(&self) {
        self.log.push("applicationCache.abort", "");
    }

    fn swap_cache(&self) -> ApiResult<()> {
        self.log.push("applicationCache.swapCache", "");
        match self.status.get() {
            CacheStatus::UpdateReady => {
                self.status.set(CacheStatus::Idle);
                Ok(())
            }
            _ => Err(DomException::invalid_state("there is no newer cache to swap to")),
        }
    }

    fn status(&self) -> CacheStatus {
        self.status.get()
    }
}

fn require_url(url: &str, schemes: &[&str]) -> ApiResult<()> {
    let parsed = Url::parse(url).map_err(|e| DomException::syntax(format!("{url:?}: {e}")))?;
    if schemes.contains(&parsed.scheme()) {
        Ok(())
    } else {
        Err(DomException::syntax(format!(
            "{url:?} has unsupported scheme {:?}",
            parsed.scheme()
        )))
    }
}

struct SimTransports {
    log: ApiCallLog,
}

impl RealtimeTransports for SimTransports {
    fn web_socket(&self, url: &str, protocols: Option<&[String]>) -> ApiResult<WebSocket> {
        self.log.push("WebSocket", format!("{url} {protocols:?}"));
        require_url(url, &["ws", "wss"])?;
        Ok(WebSocket {
            url: url.to_string(),
            requested_protocols: protocols.map(<[String]>::to_vec),
        })
    }

    fn event_source(&self, url: &str, init: Option<&EventSourceInit>) -> ApiResult<EventSource> {
        self.log.push("EventSource", format!("{url} {init:?}"));
        Ok(EventSource {
            url: url.to_string(),
            with_credentials: init.is_some_and(|i| i.with_credentials),
        })
    }
}

struct SimWorkers {
    log: ApiCallLog,
}

impl Workers for SimWorkers {
    fn worker(&self, script_url: &str, options: Option<&WorkerOptions>) -> ApiResult<Worker> {
        self.log.push("Worker", format!("{script_url} {options:?}"));
        Ok(Worker {
            script_url: script_url.to_string(),
            options: options.cloned(),
        })
    }

    fn shared_worker(&self, script_url: &str, name: Option<&str>) -> ApiResult<SharedWorker> {
        self.log.push("SharedWorker", format!("{script_url} {name:?}"));
        Ok(SharedWorker {
            script_url: script_url.to_string(),
            name: name.map(str::to_string),
        })
    }
}

struct SimMediaDevices {
    log: ApiCallLog,
    permission: Permission,
    next_stream: Cell<u32>,
}

impl MediaDevices for SimMediaDevices {
    fn get_user_media(&self, constraints: &MediaConstraints) -> ApiResult<MediaStream> {
        self.log.push("getUserMedia", format!("{constraints:?}"));
        if self.permission == Permission::Denied {
            return Err(DomException::not_allowed("Permission denied"));
        }
        if !constraints.audio && !constraints.video {
            return Err(DomException::new(
                "TypeError",
                "At least one of audio and video must be requested",
            ));
        }
        let n = self.next_stream.get();
        self.next_stream.set(n + 1);
        Ok(MediaStream {
            id: format!("stream-{n}"),
            audio_tracks: usize::from(constraints.audio),
            video_tracks: usize::from(constraints.video),
        })
    }
}

struct SimPeerConnections {
    log: ApiCallLog,
}

impl PeerConnections for SimPeerConnections {
    fn session_description(
        &self,
        init: Option<&SessionDescriptionInit>,
    ) -> ApiResult<SessionDescription> {
        self.log.push("RTCSessionDescription", format!("{init:?}"));
        Ok(SessionDescription {
            kind: init.map(|i| i.kind),
            sdp: init.map(|i| i.sdp.clone()).unwrap_or_default(),
        })
    }

    fn peer_connection(
        &self,
        configuration: Option<&RtcConfiguration>,
    ) -> ApiResult<PeerConnection> {
        self.log.push("RTCPeerConnection", format!("{configuration:?}"));
        if let Some(bad) = configuration
            .into_iter()
            .flat_map(|c| c.ice_servers.iter())
            .find(|s| !(s.starts_with("stun:") || s.starts_with("turn:")))
        {
            return Err(DomException::syntax(format!("invalid ICE server {bad:?}")));
        }
        Ok(PeerConnection {
            configuration: configuration.cloned(),
        })
    }
}

struct SimMediaSources {
    log: ApiCallLog,
}

impl MediaSources for SimMediaSources {
    fn media_source(&self) -> ApiResult<MediaSource> {
        self.log.push("MediaSource", "");
        Ok(MediaSource {
            ready_state: ReadyState::Closed,
        })
    }
}

const CONTEXT_IDS: &[&str] = &["2d", "webgl", "webgl2", "bitmaprenderer", "experimental-webgl"];

struct SimCanvas {
    log: ApiCallLog,
    bound: RefCell<HashMap<Id, String>>,
}

impl Canvas for SimCanvas {
    fn get_context(
        &self,
        canvas: Id,
        context_id: &str,
        options: Option<&ContextOptions>,
    ) -> ApiResult<Option<RenderingContext>> {
        self.log
            .push("getContext", format!("{} {context_id} {options:?}", canvas.0));
        if !CONTEXT_IDS.contains(&context_id) {
            return Ok(None);
        }
        let mut bound = self.bound.borrow_mut();
        let current = bound
            .entry(canvas)
            .or_insert_with(|| context_id.to_string());
        if current != context_id {
            return Ok(None);
        }
        Ok(Some(RenderingContext {
            canvas,
            context_id: context_id.to_string(),
        }))
    }
}

struct SimEventTargets {
    log: ApiCallLog,
    next: Cell<u64>,
}

impl EventTargets for SimEventTargets {
    fn add_event_listener(
        &self,
        target: &EventTarget,
        event_type: &str,
        options: &ListenerOptions,
    ) -> ApiResult<ListenerId> {
        self.log
            .push("addEventListener", format!("{target:?} {event_type} {options:?}"));
        let id = self.next.get();
        self.next.set(id + 1);
        Ok(ListenerId(id))
    }
}

/// Ordered in-memory storage area.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_items(items: BTreeMap<String, String>) -> Self {
        Self {
            items: RefCell::new(items),
        }
    }
}

impl Storage for MemoryStorage {
    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.items.borrow().keys().nth(index).cloned()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> ApiResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }

    fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    fn entries(&self) -> BTreeMap<String, String> {
        self.items.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> Url {
        Url::parse("https://example.test/page").expect("valid url")
    }

    #[test]
    fn denied_geolocation_raises_not_allowed() {
        let settings = SimSettings {
            geolocation: Permission::Denied,
            ..SimSettings::default()
        };
        let log = ApiCallLog::new();
        let p = platform(&http(), &settings, &log);
        let err = p
            .geolocation
            .get_current_position(&PositionOptions::default())
            .expect_err("denied");
        assert_eq!(err.name, "NotAllowedError");
        assert_eq!(log.count("getCurrentPosition"), 1);
    }

    #[test]
    fn canvas_binds_first_context_type() {
        let log = ApiCallLog::new();
        let p = platform(&http(), &SimSettings::default(), &log);
        assert!(p.canvas.get_context(Id(4), "2d", None).expect("ok").is_some());
        assert!(p.canvas.get_context(Id(4), "webgl", None).expect("ok").is_none());
        assert!(p.canvas.get_context(Id(5), "webgl", None).expect("ok").is_some());
        assert!(p.canvas.get_context(Id(5), "nope", None).expect("ok").is_none());
    }

    #[test]
    fn storage_denied_for_data_urls() {
        let data = Url::parse("data:text/html,x").expect("valid url");
        let p = platform(&data, &SimSettings::default(), &ApiCallLog::new());
        let err = p.local_storage.get().err().expect("denied");
        assert!(err.is_security_error());
    }

    #[test]
    fn memory_storage_entries_are_ordered() {
        let s = MemoryStorage::default();
        s.set_item("b", "2").expect("set");
        s.set_item("a", "1").expect("set");
        assert_eq!(s.key(0).as_deref(), Some("a"));
        assert_eq!(s.entries().len(), 2);
        s.remove_item("a");
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn websocket_keeps_protocol_shape() {
        let p = platform(&http(), &SimSettings::default(), &ApiCallLog::new());
        let bare = p.transports.web_socket("wss://x.test/", None).expect("ok");
        assert_eq!(bare.requested_protocols, None);
        let protos = vec!["chat".to_string()];
        let with = p
            .transports
            .web_socket("wss://x.test/", Some(&protos))
            .expect("ok");
        assert_eq!(with.requested_protocols, Some(protos));
        assert!(p.transports.web_socket("http://x.test/", None).is_err());
    }
}
