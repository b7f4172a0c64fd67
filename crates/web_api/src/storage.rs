use std::collections::BTreeMap;

use crate::{ApiResult, DomException};

/// A Web Storage area (`localStorage` / `sessionStorage`).
pub trait Storage {
    fn len(&self) -> usize;
    fn key(&self, index: usize) -> Option<String>;
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> ApiResult<()>;
    fn remove_item(&self, key: &str);
    fn clear(&self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items, ordered by key.
    fn entries(&self) -> BTreeMap<String, String> {
        (0..self.len())
            .filter_map(|i| self.key(i))
            .filter_map(|k| self.get_item(&k).map(|v| (k, v)))
            .collect()
    }
}

/// A storage area as the page sees it: either usable or throwing on access.
pub enum StorageSlot {
    Available(Box<dyn Storage>),
    Denied(DomException),
}

impl StorageSlot {
    pub fn get(&self) -> ApiResult<&dyn Storage> {
        match self {
            StorageSlot::Available(storage) => Ok(storage.as_ref()),
            StorageSlot::Denied(err) => Err(err.clone()),
        }
    }
}

impl std::fmt::Debug for StorageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageSlot::Available(storage) => write!(f, "Available({} items)", storage.len()),
            StorageSlot::Denied(err) => write!(f, "Denied({err})"),
        }
    }
}
