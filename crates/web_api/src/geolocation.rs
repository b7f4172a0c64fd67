use serde::Deserialize;

use crate::ApiResult;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub timestamp_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: Option<u64>,
    pub maximum_age_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct WatchId(pub u32);

/// `navigator.geolocation`.
pub trait Geolocation {
    fn get_current_position(&self, options: &PositionOptions) -> ApiResult<Position>;
    fn watch_position(&self, options: &PositionOptions) -> ApiResult<WatchId>;
    fn clear_watch(&self, id: WatchId);
}
