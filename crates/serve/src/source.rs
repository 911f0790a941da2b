// crates/serve/src/source.rs

//! Capability seams.
//!
//! This crate holds the content-resolution logic, but everything that
//! actually touches the network or the filesystem is injected from the
//! edge crate at startup through the traits below. Tests substitute fakes
//! at the same seam.

use async_trait::async_trait;
use domain::error::FetchError;
use serde_json::Value as Json;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// One named query with canonicalized variables.
///
/// Used as the cache key, so two calls that are semantically the same
/// request must produce equal keys — object keys are sorted before
/// serialization to make that hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    name: String,
    canon: String,
}

impl QueryKey {
    pub fn new(name: impl Into<String>, variables: &Json) -> Self {
        Self {
            name: name.into(),
            canon: canonical_json(variables),
        }
    }

    /// Key for a query with no variables.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, &Json::Null)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical variables document, parseable back into JSON.
    pub fn variables_json(&self) -> &str {
        &self.canon
    }
}

fn canonical_json(value: &Json) -> String {
    fn emit(value: &Json, out: &mut String) {
        match value {
            Json::Object(map) => {
                let mut entries: Vec<(&String, &Json)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                out.push('{');
                for (i, (key, val)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&Json::String((*key).clone()).to_string());
                    out.push(':');
                    emit(val, out);
                }
                out.push('}');
            }
            Json::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    emit(item, out);
                }
                out.push(']');
            }
            other => out.push_str(&other.to_string()),
        }
    }

    let mut out = String::new();
    emit(value, &mut out);
    out
}

/// Outbound GraphQL capability.
///
/// One round trip per call, no implicit retry; the implementation resolves
/// the query document from its name.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn execute(&self, name: &str, variables: Json) -> Result<Json, FetchError>;
}

/// The static JSON document set (`<name>-content.json`).
///
/// `Ok(None)` means the document does not exist or cannot be used;
/// consumers treat that as "no content", never as a failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StaticSource: Send + Sync {
    async fn load(&self, name: &str) -> Result<Option<Json>, FetchError>;
}

pub type SharedQueryClient = Arc<dyn QueryClient>;
pub type SharedStaticSource = Arc<dyn StaticSource>;
