use crate::ApiResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Uncached,
    Idle,
    Checking,
    Downloading,
    UpdateReady,
    Obsolete,
}

/// The legacy offline `applicationCache`.
pub trait ApplicationCache {
    fn update(&self) -> ApiResult<()>;
    fn abort(&self);
    fn swap_cache(&self) -> ApiResult<()>;
    fn status(&self) -> CacheStatus;
}
