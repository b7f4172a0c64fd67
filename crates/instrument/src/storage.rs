use core_types::Category;
use serde::Deserialize;
use web_api::{ApiResult, Platform, Storage};

use crate::Recorder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    Local,
    Session,
}

impl StorageArea {
    pub const ALL: [StorageArea; 2] = [StorageArea::Local, StorageArea::Session];

    pub fn key(self) -> &'static str {
        match self {
            StorageArea::Local => "localStorage",
            StorageArea::Session => "sessionStorage",
        }
    }

    pub fn open(self, platform: &Platform) -> ApiResult<&dyn Storage> {
        match self {
            StorageArea::Local => platform.local_storage.get(),
            StorageArea::Session => platform.session_storage.get(),
        }
    }
}

/// Canonical JSON of a storage area's items.
fn serialize(storage: &dyn Storage) -> String {
    serde_json::to_string(&storage.entries()).unwrap_or_default()
}

/// Storage contents captured at injection time; `None` for areas that
/// could not be read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageBaseline {
    local: Option<String>,
    session: Option<String>,
}

impl StorageBaseline {
    pub fn capture(platform: &Platform) -> Self {
        let read = |area: StorageArea| match area.open(platform) {
            Ok(storage) => Some(serialize(storage)),
            Err(err) => {
                log::debug!(target: "instrument.storage", "no {} baseline: {err}", area.key());
                None
            }
        };
        Self {
            local: read(StorageArea::Local),
            session: read(StorageArea::Session),
        }
    }

    fn get(&self, area: StorageArea) -> Option<&str> {
        match area {
            StorageArea::Local => self.local.as_deref(),
            StorageArea::Session => self.session.as_deref(),
        }
    }

    /// Marks every area whose contents differ from the baseline. Unreadable
    /// areas count as untouched.
    pub fn probe(&self, platform: &Platform, recorder: &Recorder) {
        for area in StorageArea::ALL {
            let storage = match area.open(platform) {
                Ok(storage) => storage,
                Err(err) if err.is_security_error() => continue,
                Err(err) => {
                    log::warn!(target: "instrument.storage", "{} unreadable: {err}", area.key());
                    continue;
                }
            };
            let changed = match self.get(area) {
                Some(before) => serialize(storage) != before,
                None => !storage.is_empty(),
            };
            if changed {
                log::debug!(target: "instrument.storage", "{} changed", area.key());
                recorder.mark(Category::Accessed, area.key());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use web_api::sim::{self, ApiCallLog, SimSettings};

    fn platform(url: &str, settings: &SimSettings) -> Platform {
        let url = url::Url::parse(url).expect("valid url");
        sim::platform(&url, settings, &ApiCallLog::new())
    }

    #[test]
    fn flags_changed_areas_only() {
        let settings = SimSettings {
            local_storage: BTreeMap::from([("theme".to_string(), "dark".to_string())]),
            ..SimSettings::default()
        };
        let platform = platform("https://example.test/", &settings);
        let baseline = StorageBaseline::capture(&platform);
        let recorder = Recorder::new();

        baseline.probe(&platform, &recorder);
        assert!(recorder.snapshot().is_empty());

        platform
            .session_storage
            .get()
            .expect("available")
            .set_item("step", "2")
            .expect("quota");
        baseline.probe(&platform, &recorder);
        assert_eq!(recorder.get(Category::Accessed, "sessionStorage"), Some(1));
        assert_eq!(recorder.get(Category::Accessed, "localStorage"), None);

        // Flags are set-presence; probing again does not accumulate.
        baseline.probe(&platform, &recorder);
        assert_eq!(recorder.get(Category::Accessed, "sessionStorage"), Some(1));
    }

    #[test]
    fn reverted_change_is_not_flagged() {
        let platform = platform("https://example.test/", &SimSettings::default());
        let baseline = StorageBaseline::capture(&platform);
        let local = platform.local_storage.get().expect("available");
        local.set_item("k", "v").expect("quota");
        local.remove_item("k");

        let recorder = Recorder::new();
        baseline.probe(&platform, &recorder);
        assert!(recorder.snapshot().is_empty());
    }

    #[test]
    fn denied_storage_is_swallowed() {
        let platform = platform("data:text/html,<p>hi</p>", &SimSettings::default());
        let baseline = StorageBaseline::capture(&platform);
        assert_eq!(baseline, StorageBaseline::default());

        let recorder = Recorder::new();
        baseline.probe(&platform, &recorder);
        assert!(recorder.snapshot().is_empty());
    }
}
