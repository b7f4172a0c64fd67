use serde::Deserialize;
use thiserror::Error;

/// Every wrapped platform entry point, by the name it is reported under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum ApiId {
    GetCurrentPosition,
    WatchPosition,
    ClearWatch,
    AppCacheUpdate,
    AppCacheAbort,
    AppCacheSwapCache,
    WebSocket,
    EventSource,
    Worker,
    SharedWorker,
    GetUserMedia,
    RtcSessionDescription,
    RtcPeerConnection,
    MediaSource,
    CanvasGetContext,
}

impl ApiId {
    pub const ALL: [ApiId; 15] = [
        ApiId::GetCurrentPosition,
        ApiId::WatchPosition,
        ApiId::ClearWatch,
        ApiId::AppCacheUpdate,
        ApiId::AppCacheAbort,
        ApiId::AppCacheSwapCache,
        ApiId::WebSocket,
        ApiId::EventSource,
        ApiId::Worker,
        ApiId::SharedWorker,
        ApiId::GetUserMedia,
        ApiId::RtcSessionDescription,
        ApiId::RtcPeerConnection,
        ApiId::MediaSource,
        ApiId::CanvasGetContext,
    ];

    pub fn qualified_name(self) -> &'static str {
        match self {
            ApiId::GetCurrentPosition => "navigator.geolocation.getCurrentPosition",
            ApiId::WatchPosition => "navigator.geolocation.watchPosition",
            ApiId::ClearWatch => "navigator.geolocation.clearWatch",
            ApiId::AppCacheUpdate => "applicationCache.update",
            ApiId::AppCacheAbort => "applicationCache.abort",
            ApiId::AppCacheSwapCache => "applicationCache.swapCache",
            ApiId::WebSocket => "WebSocket",
            ApiId::EventSource => "EventSource",
            ApiId::Worker => "Worker",
            ApiId::SharedWorker => "SharedWorker",
            ApiId::GetUserMedia => "navigator.webkitGetUserMedia",
            ApiId::RtcSessionDescription => "RTCSessionDescription",
            ApiId::RtcPeerConnection => "webkitRTCPeerConnection",
            ApiId::MediaSource => "MediaSource",
            ApiId::CanvasGetContext => "HTMLCanvasElement.getContext",
        }
    }
}

impl std::fmt::Display for ApiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.qualified_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown platform API {0:?}")]
pub struct UnknownApi(pub String);

impl std::str::FromStr for ApiId {
    type Err = UnknownApi;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiId::ALL
            .into_iter()
            .find(|api| api.qualified_name() == s)
            .ok_or_else(|| UnknownApi(s.to_string()))
    }
}

impl TryFrom<String> for ApiId {
    type Error = UnknownApi;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
