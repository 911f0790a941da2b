// crates/edge/src/home.rs

//! Home-content store.
//!
//! Keeps the last-known-good home document in memory, serves it
//! immediately, and folds in CMS refreshes and admin updates in
//! request-start order. Arrival order never decides: a response for a
//! superseded request is discarded when it lands.

use std::path::PathBuf;
use std::sync::Arc;

use domain::section::HomeDocument;
use parking_lot::RwLock;
use serde_json::Value as Json;
use serve::cache::QueryCache;
use serve::resolver::{LatestWins, Ticket};
use serve::source::QueryKey;
use tracing::{debug, error, info, warn};

use crate::{fs, Error, Result};

/// Seed document compiled into the binary, so the store is never empty.
const DEFAULT_DOC: &str = include_str!("../assets/home-default.json");

#[derive(Debug)]
pub struct PutOutcome {
    /// False when the filesystem rejected the write; the in-memory
    /// document still updated (soft success).
    pub persisted: bool,
}

pub struct HomeStore {
    cache: Arc<QueryCache>,
    overrides_path: PathBuf,
    current: RwLock<Arc<Json>>,
    session: LatestWins,
}

impl HomeStore {
    /// The overrides file wins over the bundled default; CMS content
    /// arrives later via [`HomeStore::refresh`].
    pub async fn open(cache: Arc<QueryCache>, overrides_path: PathBuf) -> Result<Self> {
        let initial = match tokio::fs::read_to_string(&overrides_path).await {
            Ok(raw) => match serde_json::from_str::<Json>(&raw) {
                Ok(doc) if validate(&doc).is_ok() => {
                    info!(path = %overrides_path.display(), "loaded home overrides");
                    doc
                }
                _ => {
                    warn!(
                        path = %overrides_path.display(),
                        "home overrides unreadable; using bundled default"
                    );
                    serde_json::from_str(DEFAULT_DOC)?
                }
            },
            Err(_) => serde_json::from_str(DEFAULT_DOC)?,
        };

        Ok(Self {
            cache,
            overrides_path,
            current: RwLock::new(Arc::new(initial)),
            session: LatestWins::new(),
        })
    }

    pub fn current(&self) -> Arc<Json> {
        self.current.read().clone()
    }

    /// Draws the ordering ticket for a refresh. Call this when the
    /// triggering request starts, not inside the detached task: a ticket
    /// drawn at first poll would put the refresh in line behind an update
    /// that actually arrived later.
    pub fn begin_refresh(&self) -> Ticket {
        self.session.begin()
    }

    /// Pulls the CMS home document. Invalid payloads and stale arrivals
    /// both leave the current document untouched.
    pub async fn refresh(&self, ticket: Ticket) {
        match self.cache.fetch(&QueryKey::bare("home")).await {
            Ok(payload) => {
                let Some(doc) = extract_document(&payload) else {
                    debug!("home payload carried no document; keeping current content");
                    return;
                };
                if validate(&doc).is_err() {
                    warn!("home payload failed validation; keeping current content");
                    return;
                }
                // Lock before the staleness check: check and write are one
                // step, so an update cannot land between them and be undone.
                let mut current = self.current.write();
                if self.session.commit(ticket) {
                    *current = Arc::new(doc);
                } else {
                    debug!("discarding superseded home refresh");
                }
            }
            // Transport trouble is routine; a rejected query means the
            // document or registry drifted and needs a look.
            Err(error) if error.is_transport() => {
                warn!(%error, "home refresh failed; keeping current content");
            }
            Err(error) => error!(%error, "home query rejected; keeping current content"),
        }
    }

    /// Admin update: validate, replace memory, then persist. A rejected
    /// write downgrades to a soft success so editors keep a working
    /// in-memory document; a validation failure changes nothing.
    pub async fn update(&self, body: Json) -> Result<PutOutcome> {
        validate(&body)?;

        {
            // The update is the newest request as of this instant;
            // beginning a ticket supersedes every in-flight refresh. Under
            // the lock, no refresh can commit between the begin and the
            // write.
            let mut current = self.current.write();
            self.session.begin();
            *current = Arc::new(body.clone());
        }

        let bytes = serde_json::to_vec_pretty(&body)?;
        let persisted = match fs::write_atomic(&self.overrides_path, &bytes).await {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    path = %self.overrides_path.display(),
                    %error,
                    "home overrides not persisted"
                );
                false
            }
        };
        Ok(PutOutcome { persisted })
    }
}

fn validate(doc: &Json) -> Result<()> {
    serde_json::from_value::<HomeDocument>(doc.clone())
        .map(|_| ())
        .map_err(|e| Error::Validation(e.to_string()))
}

// The home query wraps the editorial document under `page.homeContent`.
fn extract_document(payload: &Json) -> Option<Json> {
    let doc = payload.get("page")?.get("homeContent")?;
    (!doc.is_null()).then(|| doc.clone())
}
