use serde::Deserialize;

use crate::ApiResult;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaStream {
    pub id: String,
    pub audio_tracks: usize,
    pub video_tracks: usize,
}

/// Media capture entry point (`navigator.webkitGetUserMedia`).
pub trait MediaDevices {
    fn get_user_media(&self, constraints: &MediaConstraints) -> ApiResult<MediaStream>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Closed,
    Open,
    Ended,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    pub ready_state: ReadyState,
}

/// `new MediaSource()`.
pub trait MediaSources {
    fn media_source(&self) -> ApiResult<MediaSource>;
}
