use html::Id;
use serde::Deserialize;

use crate::ApiResult;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextOptions {
    pub alpha: Option<bool>,
    pub desynchronized: Option<bool>,
    pub antialias: Option<bool>,
}

impl std::fmt::Display for ContextOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = [
            ("alpha", self.alpha),
            ("desynchronized", self.desynchronized),
            ("antialias", self.antialias),
        ];
        let set: Vec<String> = fields
            .iter()
            .filter_map(|(k, v)| v.map(|v| format!("{k}: {v}")))
            .collect();
        write!(f, "{{{}}}", set.join(", "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderingContext {
    pub canvas: Id,
    pub context_id: String,
}

/// `HTMLCanvasElement.prototype.getContext`.
pub trait Canvas {
    /// `Ok(None)` for unsupported context ids or a canvas already bound to
    /// another context type.
    fn get_context(
        &self,
        canvas: Id,
        context_id: &str,
        options: Option<&ContextOptions>,
    ) -> ApiResult<Option<RenderingContext>>;
}
