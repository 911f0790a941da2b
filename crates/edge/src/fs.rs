// crates/edge/src/fs.rs

//! Filesystem-backed static content.
//!
//! Each document lives at `<root>/<name>-content.json`. Missing or
//! malformed files read as "no content" so a bad deploy degrades to
//! defaults instead of failing the page.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use domain::error::FetchError;
use regex::Regex;
use serde_json::Value as Json;
use serve::source::StaticSource;
use tokio::fs;
use tracing::{debug, warn};

static RE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

const CONTENT_SUFFIX: &str = "-content.json";

#[derive(Debug, Clone)]
pub struct ContentDir {
    root: PathBuf,
}

impl ContentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a named document, provided the name is well-formed. Names
    /// are a closed lowercase alphabet, so a crafted request cannot reach
    /// outside the content directory.
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        RE_NAME
            .is_match(name)
            .then(|| self.root.join(format!("{name}{CONTENT_SUFFIX}")))
    }

    pub async fn read_json(&self, name: &str) -> Option<Json> {
        let path = match self.path_for(name) {
            Some(path) => path,
            None => {
                warn!(name, "rejected static content name");
                return None;
            }
        };
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "static content absent");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "static content unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "static content malformed");
                None
            }
        }
    }
}

#[async_trait]
impl StaticSource for ContentDir {
    async fn load(&self, name: &str) -> Result<Option<Json>, FetchError> {
        Ok(self.read_json(name).await)
    }
}

/// Write via a temp sibling plus rename so readers never observe a
/// half-written document.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await
}
