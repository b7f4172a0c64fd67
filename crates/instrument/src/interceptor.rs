use std::collections::BTreeSet;
use std::rc::Rc;

use core_types::Category;
use html::Id;
use web_api::{
    ApiResult, ApplicationCache, CacheStatus, Canvas, ContextOptions, EventSource, EventSourceInit,
    Geolocation, MediaConstraints, MediaDevices, MediaSource, MediaSources, MediaStream,
    PeerConnection, PeerConnections, Platform, Position, PositionOptions, RealtimeTransports,
    RenderingContext, RtcConfiguration, SessionDescription, SessionDescriptionInit, SharedWorker,
    WatchId, WebSocket, Worker, WorkerOptions, Workers,
};

use crate::{ApiId, InstrumentConfig, Recorder};

/// Counts one access per call, keyed by API name and optionally by arguments.
#[derive(Clone, Debug)]
pub(crate) struct Tally {
    recorder: Recorder,
    record_arguments: Rc<BTreeSet<ApiId>>,
}

impl Tally {
    pub(crate) fn new(recorder: Recorder, config: &InstrumentConfig) -> Self {
        Self {
            recorder,
            record_arguments: Rc::new(config.record_arguments.clone()),
        }
    }

    /// `args` is only rendered when `api` is configured to record arguments.
    fn hit(&self, api: ApiId, args: impl FnOnce() -> Vec<String>) {
        let key = access_key(api, self.record_arguments.contains(&api).then(args));
        log::trace!(target: "instrument.interceptor", "access {key}");
        self.recorder.increment(Category::Accessed, &key);
    }
}

pub(crate) fn access_key(api: ApiId, args: Option<Vec<String>>) -> String {
    match args {
        Some(args) => format!("{}({})", api.qualified_name(), args.join(", ")),
        None => api.qualified_name().to_string(),
    }
}

/// Counting proxy around one platform entry point group.
pub(crate) struct Counted<T: ?Sized> {
    inner: Box<T>,
    tally: Tally,
}

impl<T: ?Sized> Counted<T> {
    fn boxed(inner: Box<T>, tally: &Tally) -> Box<Self> {
        Box::new(Self {
            inner,
            tally: tally.clone(),
        })
    }
}

impl Geolocation for Counted<dyn Geolocation> {
    fn get_current_position(&self, options: &PositionOptions) -> ApiResult<Position> {
        self.tally
            .hit(ApiId::GetCurrentPosition, || vec![format!("{options:?}")]);
        self.inner.get_current_position(options)
    }

    fn watch_position(&self, options: &PositionOptions) -> ApiResult<WatchId> {
        self.tally
            .hit(ApiId::WatchPosition, || vec![format!("{options:?}")]);
        self.inner.watch_position(options)
    }

    fn clear_watch(&self, id: WatchId) {
        self.tally.hit(ApiId::ClearWatch, || vec![id.0.to_string()]);
        self.inner.clear_watch(id)
    }
}

impl ApplicationCache for Counted<dyn ApplicationCache> {
    fn update(&self) -> ApiResult<()> {
        self.tally.hit(ApiId::AppCacheUpdate, Vec::new);
        self.inner.update()
    }

    fn abort(&self) {
        self.tally.hit(ApiId::AppCacheAbort, Vec::new);
        self.inner.abort()
    }

    fn swap_cache(&self) -> ApiResult<()> {
        self.tally.hit(ApiId::AppCacheSwapCache, Vec::new);
        self.inner.swap_cache()
    }

    fn status(&self) -> CacheStatus {
        self.inner.status()
    }
}

impl RealtimeTransports for Counted<dyn RealtimeTransports> {
    fn web_socket(&self, url: &str, protocols: Option<&[String]>) -> ApiResult<WebSocket> {
        self.tally.hit(ApiId::WebSocket, || {
            let mut args = vec![url.to_string()];
            args.extend(protocols.map(|p| p.join(",")));
            args
        });
        self.inner.web_socket(url, protocols)
    }

    fn event_source(&self, url: &str, init: Option<&EventSourceInit>) -> ApiResult<EventSource> {
        self.tally.hit(ApiId::EventSource, || {
            let mut args = vec![url.to_string()];
            args.extend(init.map(|i| format!("{i:?}")));
            args
        });
        self.inner.event_source(url, init)
    }
}

impl Workers for Counted<dyn Workers> {
    fn worker(&self, script_url: &str, options: Option<&WorkerOptions>) -> ApiResult<Worker> {
        self.tally.hit(ApiId::Worker, || {
            let mut args = vec![script_url.to_string()];
            args.extend(options.map(|o| format!("{o:?}")));
            args
        });
        self.inner.worker(script_url, options)
    }

    fn shared_worker(&self, script_url: &str, name: Option<&str>) -> ApiResult<SharedWorker> {
        self.tally.hit(ApiId::SharedWorker, || {
            let mut args = vec![script_url.to_string()];
            args.extend(name.map(str::to_string));
            args
        });
        self.inner.shared_worker(script_url, name)
    }
}

impl MediaDevices for Counted<dyn MediaDevices> {
    fn get_user_media(&self, constraints: &MediaConstraints) -> ApiResult<MediaStream> {
        self.tally
            .hit(ApiId::GetUserMedia, || vec![format!("{constraints:?}")]);
        self.inner.get_user_media(constraints)
    }
}

impl PeerConnections for Counted<dyn PeerConnections> {
    fn session_description(
        &self,
        init: Option<&SessionDescriptionInit>,
    ) -> ApiResult<SessionDescription> {
        self.tally.hit(ApiId::RtcSessionDescription, || {
            init.map(|i| format!("{i:?}")).into_iter().collect()
        });
        self.inner.session_description(init)
    }

    fn peer_connection(
        &self,
        configuration: Option<&RtcConfiguration>,
    ) -> ApiResult<PeerConnection> {
        self.tally.hit(ApiId::RtcPeerConnection, || {
            configuration.map(|c| format!("{c:?}")).into_iter().collect()
        });
        self.inner.peer_connection(configuration)
    }
}

impl MediaSources for Counted<dyn MediaSources> {
    fn media_source(&self) -> ApiResult<MediaSource> {
        self.tally.hit(ApiId::MediaSource, Vec::new);
        self.inner.media_source()
    }
}

impl Canvas for Counted<dyn Canvas> {
    fn get_context(
        &self,
        canvas: Id,
        context_id: &str,
        options: Option<&ContextOptions>,
    ) -> ApiResult<Option<RenderingContext>> {
        self.tally.hit(ApiId::CanvasGetContext, || {
            let mut args = vec![context_id.to_string()];
            args.extend(options.map(ContextOptions::to_string));
            args
        });
        self.inner.get_context(canvas, context_id, options)
    }
}

/// Replaces every capability entry of `platform` with a counting proxy.
///
/// Event targets and storage are left alone; listeners get their own monitor
/// and storage is observed by snapshot diff.
pub(crate) fn wrap_capabilities(platform: Platform, tally: &Tally) -> Platform {
    let Platform {
        geolocation,
        application_cache,
        transports,
        workers,
        media_devices,
        peer_connections,
        media_sources,
        canvas,
        events,
        local_storage,
        session_storage,
    } = platform;

    Platform {
        geolocation: Counted::boxed(geolocation, tally),
        application_cache: Counted::boxed(application_cache, tally),
        transports: Counted::boxed(transports, tally),
        workers: Counted::boxed(workers, tally),
        media_devices: Counted::boxed(media_devices, tally),
        peer_connections: Counted::boxed(peer_connections, tally),
        media_sources: Counted::boxed(media_sources, tally),
        canvas: Counted::boxed(canvas, tally),
        events,
        local_storage,
        session_storage,
    }
}
