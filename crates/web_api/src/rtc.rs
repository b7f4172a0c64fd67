use serde::Deserialize;

use crate::ApiResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SessionDescriptionInit {
    #[serde(rename = "type")]
    pub kind: SdpType,
    #[serde(default)]
    pub sdp: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: Option<SdpType>,
    pub sdp: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RtcConfiguration {
    pub ice_servers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerConnection {
    pub configuration: Option<RtcConfiguration>,
}

/// `new RTCSessionDescription(..)` and `new webkitRTCPeerConnection(..)`.
pub trait PeerConnections {
    fn session_description(
        &self,
        init: Option<&SessionDescriptionInit>,
    ) -> ApiResult<SessionDescription>;
    fn peer_connection(&self, configuration: Option<&RtcConfiguration>)
    -> ApiResult<PeerConnection>;
}
