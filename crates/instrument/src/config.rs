use std::collections::BTreeSet;

use serde::Deserialize;

use crate::ApiId;

/// Tuning for one injection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// APIs whose access key also encodes the call arguments, so that
    /// `getContext(2d)` and `getContext(webgl)` count separately.
    pub record_arguments: BTreeSet<ApiId>,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            record_arguments: BTreeSet::from([ApiId::CanvasGetContext]),
        }
    }
}

impl InstrumentConfig {
    pub fn records_arguments(&self, api: ApiId) -> bool {
        self.record_arguments.contains(&api)
    }
}
