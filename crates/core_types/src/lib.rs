mod counters;

pub use counters::{Category, CounterStore, merge};

pub type RequestId = u64;

/// Identifies one (re)load of the monitored page.
///
/// Every load gets a fresh current store, so results tagged with an older
/// `LoadId` belong to a store that no longer exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(pub u64);

impl LoadId {
    pub const NONE: LoadId = LoadId(0);

    pub fn next(self) -> LoadId {
        LoadId(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "load#{}", self.0)
    }
}
