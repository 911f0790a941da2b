// crates/serve/src/resolver.rs

//! Source-plan driven content resolution.
//!
//! Every logical page carries an authoritative plan: an optional primary
//! GraphQL step and an optional static-document fallback. Resolution walks
//! the plan in order and produces exactly one of three outcomes:
//!
//!   - `Resolved` — a payload plus which source produced it
//!   - `NotFound` — every configured source definitively had no content
//!   - `Failed`   — a source failed and nothing later recovered
//!
//! An empty collection under a present payload root is *data* (the page
//! renders its empty state); only an absent or null root moves resolution
//! on to the next source.

use crate::cache::QueryCache;
use crate::source::{QueryKey, SharedStaticSource};
use domain::error::FetchError;
use serde_json::{json, Value as Json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// -----------------------------------------------------------------------------
// Pages and their source plans
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    BlogIndex,
    BlogPost { slug: String },
    CaseStudyIndex,
    CaseStudyDetail { slug: String },
    Services,
    ServiceDetail { slug: String },
    Industries,
    IndustryDetail { slug: String },
    About,
    Resources,
    Navbar,
    Engagements,
}

/// Primary query step of a plan.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub name: &'static str,
    pub variables: Json,
}

/// Where a page's content comes from, in order.
///
/// Authoritative per page: a page without a fallback goes straight to
/// `NotFound` when its primary turns up empty, and a page without a
/// primary is served from its static document alone.
#[derive(Debug, Clone)]
pub struct SourcePlan {
    pub primary: Option<QuerySpec>,
    /// Member that must be present and non-null in the primary payload for
    /// it to count as content.
    pub primary_root: &'static str,
    /// Static document name (`<name>-content.json`).
    pub fallback: Option<&'static str>,
}

impl Page {
    pub fn plan(&self) -> SourcePlan {
        match self {
            Page::Home => SourcePlan {
                primary: Some(QuerySpec {
                    name: "home",
                    variables: Json::Null,
                }),
                primary_root: "page",
                fallback: None,
            },
            Page::BlogIndex => SourcePlan {
                primary: Some(QuerySpec {
                    name: "posts",
                    variables: json!({ "first": 12 }),
                }),
                primary_root: "posts",
                fallback: None,
            },
            Page::BlogPost { slug } => SourcePlan {
                primary: Some(QuerySpec {
                    name: "post_by_slug",
                    variables: json!({ "slug": slug }),
                }),
                primary_root: "postBy",
                fallback: None,
            },
            Page::CaseStudyIndex => SourcePlan {
                primary: Some(QuerySpec {
                    name: "case_studies",
                    variables: json!({ "first": 24 }),
                }),
                primary_root: "caseStudies",
                fallback: None,
            },
            Page::CaseStudyDetail { slug } => SourcePlan {
                primary: Some(QuerySpec {
                    name: "case_study_by_slug",
                    variables: json!({ "slug": slug }),
                }),
                primary_root: "caseStudy",
                fallback: None,
            },
            Page::Services => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("services"),
            },
            Page::ServiceDetail { .. } => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("services"),
            },
            Page::Industries => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("industries"),
            },
            Page::IndustryDetail { .. } => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("industries"),
            },
            Page::About => SourcePlan {
                primary: Some(QuerySpec {
                    name: "about_page",
                    variables: Json::Null,
                }),
                primary_root: "page",
                fallback: Some("about"),
            },
            Page::Resources => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("resources"),
            },
            Page::Navbar => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("navbar"),
            },
            Page::Engagements => SourcePlan {
                primary: None,
                primary_root: "",
                fallback: Some("engagements"),
            },
        }
    }

    /// Narrow a source payload to this page's content. Detail pages pick
    /// their item out of the listing document; every other page takes the
    /// payload whole.
    fn narrow(&self, payload: &Json) -> Option<Json> {
        match self {
            Page::ServiceDetail { slug } | Page::IndustryDetail { slug } => payload
                .get("items")
                .and_then(Json::as_array)
                .and_then(|items| {
                    items
                        .iter()
                        .find(|item| item.get("slug").and_then(Json::as_str) == Some(slug))
                })
                .cloned(),
            _ => Some(payload.clone()),
        }
    }
}

// -----------------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cms,
    Static,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved { payload: Arc<Json>, origin: Origin },
    NotFound,
    Failed(FetchError),
}

impl Resolution {
    pub fn payload(&self) -> Option<&Json> {
        match self {
            Resolution::Resolved { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

pub struct Resolver {
    cache: Arc<QueryCache>,
    statics: SharedStaticSource,
}

impl Resolver {
    pub fn new(cache: Arc<QueryCache>, statics: SharedStaticSource) -> Self {
        Self { cache, statics }
    }

    #[tracing::instrument(skip_all, fields(page = ?page))]
    pub async fn resolve(&self, page: &Page) -> Resolution {
        let plan = page.plan();
        let mut last_error: Option<FetchError> = None;

        // -------------------------------------------
        // Step 1: primary source, through the cache
        // -------------------------------------------
        if let Some(query) = &plan.primary {
            let key = QueryKey::new(query.name, &query.variables);
            match self.cache.fetch(&key).await {
                Ok(payload) => {
                    if root_present(&payload, plan.primary_root) {
                        return match page.narrow(&payload) {
                            Some(content) => Resolution::Resolved {
                                payload: Arc::new(content),
                                origin: Origin::Cms,
                            },
                            None => Resolution::NotFound,
                        };
                    }
                    tracing::debug!(
                        query = query.name,
                        root = plan.primary_root,
                        "primary payload has no root; trying fallback"
                    );
                }
                Err(error) => {
                    tracing::warn!(query = query.name, %error, "primary fetch failed; trying fallback");
                    last_error = Some(error);
                }
            }
        }

        // -------------------------------------------
        // Step 2: static fallback, when configured
        // -------------------------------------------
        if let Some(name) = plan.fallback {
            match self.statics.load(name).await {
                Ok(Some(doc)) => {
                    return match page.narrow(&doc) {
                        Some(content) => Resolution::Resolved {
                            payload: Arc::new(content),
                            origin: Origin::Static,
                        },
                        None => Resolution::NotFound,
                    };
                }
                Ok(None) => {
                    tracing::debug!(document = name, "fallback document absent");
                }
                Err(error) => {
                    tracing::warn!(document = name, %error, "fallback load failed");
                    last_error = Some(error);
                }
            }
        }

        // -------------------------------------------
        // Step 3: verdict
        // -------------------------------------------
        // A failure anywhere without a later recovery is an error; only
        // all-sources-definitively-empty is NotFound.
        match last_error {
            Some(error) => Resolution::Failed(error),
            None => Resolution::NotFound,
        }
    }
}

fn root_present(payload: &Json, root: &str) -> bool {
    if root.is_empty() {
        return !payload.is_null();
    }
    payload.get(root).is_some_and(|value| !value.is_null())
}

// -----------------------------------------------------------------------------
// Request-start ordering
// -----------------------------------------------------------------------------

/// Orders overlapping resolutions of one logical target by request start.
///
/// `begin()` issues a monotonically increasing ticket; `commit(ticket)`
/// succeeds only while no newer ticket has been issued. The caller of a
/// late response for a superseded request discards it instead of
/// overwriting fresher state — cancellation is ignore-on-arrival, not an
/// abort.
#[derive(Debug, Default)]
pub struct LatestWins {
    issued: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl LatestWins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn commit(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}
