use std::fs;
use std::path::{Path, PathBuf};

use instrument::InstrumentConfig;
use panel::ReportFormat;
use serde::Deserialize;
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "h5audit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
        path: PathBuf,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub instrument: InstrumentConfig,
    pub reload: ReloadSection,
    pub log: LogSection,
    pub report: ReportSection,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReloadSection {
    pub ignore_cache: bool,
}

impl Default for ReloadSection {
    fn default() -> Self {
        Self { ignore_cache: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub format: ReportFormat,
}

fn load_toml(path: &Path) -> Result<AuditConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}

/// Loads `path`, or [`DEFAULT_CONFIG`] when it exists, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AuditConfig, ConfigError> {
    match path {
        Some(path) => load_toml(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG);
            if fallback.is_file() {
                load_toml(fallback)
            } else {
                Ok(AuditConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instrument::ApiId;

    #[test]
    fn sections_default_independently() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("audit.toml");
        fs::write(
            &path,
            "[reload]\nignore_cache = false\n\n[instrument]\nrecord_arguments = [\"WebSocket\"]\n",
        )
        .expect("write config");

        let config = load_config(Some(&path)).expect("loads");
        assert!(!config.reload.ignore_cache);
        assert!(config.instrument.records_arguments(ApiId::WebSocket));
        assert!(!config.instrument.records_arguments(ApiId::CanvasGetContext));
        assert_eq!(config.log, LogSection::default());
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn explicit_path_must_exist_and_parse() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[report]\nformat = \"yaml\"\n").expect("write config");
        let err = load_config(Some(&bad)).expect_err("unknown format");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"), "{err}");
    }
}
