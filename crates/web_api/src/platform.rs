use html::Node;
use url::Url;

use crate::{
    ApiResult, ApplicationCache, Canvas, EventTargets, Geolocation, MediaDevices, MediaSources,
    PeerConnections, RealtimeTransports, Storage, StorageSlot, Workers,
};

/// Registration table of every platform entry point a page can reach.
///
/// Instrumentation consumes a `Platform` and hands back one whose entries
/// delegate to the originals; nothing global is patched.
pub struct Platform {
    pub geolocation: Box<dyn Geolocation>,
    pub application_cache: Box<dyn ApplicationCache>,
    pub transports: Box<dyn RealtimeTransports>,
    pub workers: Box<dyn Workers>,
    pub media_devices: Box<dyn MediaDevices>,
    pub peer_connections: Box<dyn PeerConnections>,
    pub media_sources: Box<dyn MediaSources>,
    pub canvas: Box<dyn Canvas>,
    pub events: Box<dyn EventTargets>,
    pub local_storage: StorageSlot,
    pub session_storage: StorageSlot,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("local_storage", &self.local_storage)
            .field("session_storage", &self.session_storage)
            .finish_non_exhaustive()
    }
}

/// The page's global scope: its URL, live document and platform.
#[derive(Debug)]
pub struct Window {
    url: Url,
    document: Node,
    platform: Platform,
}

impl Window {
    pub fn new(url: Url, document: Node, platform: Platform) -> Self {
        Self {
            url,
            document,
            platform,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Node {
        &mut self.document
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn local_storage(&self) -> ApiResult<&dyn Storage> {
        self.platform.local_storage.get()
    }

    pub fn session_storage(&self) -> ApiResult<&dyn Storage> {
        self.platform.session_storage.get()
    }
}

/// Opaque origins (`data:`, `about:`, sandboxed documents) get no Web Storage.
pub fn has_opaque_origin(url: &Url) -> bool {
    !url.origin().is_tuple() && url.scheme() != "file"
}
