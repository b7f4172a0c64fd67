use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bus::Action;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use web_api::sim::SimSettings;

/// Script that runs when a page loads, plus the platform it runs against.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageScript {
    pub settings: SimSettings,
    pub actions: Vec<Action>,
}

impl PageScript {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Clone, Debug)]
pub struct PageSource {
    pub url: Url,
    pub html: String,
    pub script: PageScript,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0} cannot be expressed as a file URL")]
    NotAbsolute(PathBuf),
    #[error("no page registered for {0:?}")]
    Unknown(String),
}

/// Resolves a page location to its source.
pub trait PageLoader {
    /// `bypass_cache` forces a fresh read even when a cached copy exists.
    fn fetch(&mut self, source: &str, bypass_cache: bool) -> Result<PageSource, LoadError>;
}

/// Reads `page.html` and, when present, its companion `page.toml` script.
#[derive(Debug, Default)]
pub struct FileLoader {
    cache: HashMap<PathBuf, PageSource>,
    script: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `path` as the page script for every page instead of the companion.
    pub fn with_script(mut self, path: PathBuf) -> Self {
        self.script = Some(path);
        self
    }

    pub fn companion_script(path: &Path) -> PathBuf {
        path.with_extension("toml")
    }

    fn read(&self, path: &Path) -> Result<PageSource, LoadError> {
        let absolute = fs::canonicalize(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let html = fs::read_to_string(&absolute).map_err(|source| LoadError::Io {
            path: absolute.clone(),
            source,
        })?;

        let script_path = match &self.script {
            Some(explicit) => explicit.clone(),
            None => Self::companion_script(&absolute),
        };
        let script = if self.script.is_some() || script_path.is_file() {
            let text = fs::read_to_string(&script_path).map_err(|source| LoadError::Io {
                path: script_path.clone(),
                source,
            })?;
            PageScript::parse(&text).map_err(|source| LoadError::Script {
                path: script_path,
                source,
            })?
        } else {
            PageScript::default()
        };

        let url =
            Url::from_file_path(&absolute).map_err(|()| LoadError::NotAbsolute(absolute.clone()))?;
        Ok(PageSource { url, html, script })
    }
}

impl PageLoader for FileLoader {
    fn fetch(&mut self, source: &str, bypass_cache: bool) -> Result<PageSource, LoadError> {
        let path = PathBuf::from(source);
        if !bypass_cache {
            if let Some(page) = self.cache.get(&path) {
                log::debug!(target: "runtime_page.loader", "cache hit for {}", path.display());
                return Ok(page.clone());
            }
        }
        let page = self.read(&path)?;
        log::debug!(target: "runtime_page.loader", "read {} ({} bytes)", page.url, page.html.len());
        self.cache.insert(path, page.clone());
        Ok(page)
    }
}

/// Pages registered in memory under arbitrary names.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    pages: HashMap<String, PageSource>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, page: PageSource) {
        self.pages.insert(name.into(), page);
    }
}

impl PageLoader for MemoryLoader {
    fn fetch(&mut self, source: &str, _bypass_cache: bool) -> Result<PageSource, LoadError> {
        self.pages
            .get(source)
            .cloned()
            .ok_or_else(|| LoadError::Unknown(source.to_string()))
    }
}
