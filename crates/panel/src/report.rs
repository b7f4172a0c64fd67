use std::collections::BTreeSet;
use std::fmt::Write as _;

use core_types::{Category, CounterStore};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

/// One report: this load's store beside the session-plus-current view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub current: CounterStore,
    pub session: CounterStore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Text => self.to_text(),
        }
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json(&self) -> String {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        if let Err(err) = self.serialize(&mut ser) {
            log::error!(target: "panel", "report serialization failed: {err}");
            return String::new();
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Per-category table with `current` and `session` columns.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(error) = &self.error {
            let _ = writeln!(out, "error: {error}\n");
        }
        for category in Category::ALL {
            let current = self.current.category(category);
            let session = self.session.category(category);
            let keys: BTreeSet<&String> = current.keys().chain(session.keys()).collect();

            let _ = writeln!(out, "{category}");
            if keys.is_empty() {
                let _ = writeln!(out, "  (none)");
                continue;
            }
            let width = keys.iter().map(|k| k.len()).max().unwrap_or(0);
            let _ = writeln!(out, "  {:<width$}  {:>8}  {:>8}", "", "current", "session");
            for key in keys {
                let now = current.get(key).copied().unwrap_or(0);
                let total = session.get(key).copied().unwrap_or(0);
                let _ = writeln!(out, "  {key:<width$}  {now:>8}  {total:>8}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        let mut current = CounterStore::new();
        current.increment(Category::Accessed, "Worker");
        let mut session = current.clone();
        session.increment(Category::Accessed, "Worker");
        session.mark(Category::Doctypes, "HTML5");
        Report {
            current,
            session,
            error: None,
        }
    }

    #[test]
    fn json_uses_four_space_indent() {
        let json = sample().to_json();
        assert!(json.starts_with("{\n    \"current\": {\n        \"accessed\": {"), "{json}");
        assert!(!json.contains("\"error\""));

        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["session"]["accessed"]["Worker"], 2);
        assert_eq!(value["session"]["doctypes"]["HTML5"], 1);
    }

    #[test]
    fn text_lists_both_columns() {
        let report = Report {
            error: Some("boom".into()),
            ..sample()
        };
        let text = report.render(ReportFormat::Text);
        assert!(text.starts_with("error: boom\n"));
        assert!(text.contains("  Worker         1         2"), "{text}");
        assert!(text.contains("listeners\n  (none)"), "{text}");
    }
}
