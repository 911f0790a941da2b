// crates/edge/src/router.rs

//! HTTP surface: CMS proxy, static content, home document, auth.

use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::{BoxError, ServiceBuilder};
use tracing::warn;

use crate::auth::{gate, AuthService, SESSION_COOKIE};
use crate::fs::ContentDir;
use crate::graphql::GraphqlClient;
use crate::home::HomeStore;
use domain::setting::Settings;
use serve::cache::QueryCache;

/// Edge-cache policy for the home document: serve cached for an hour,
/// revalidate in the background.
pub const HOME_CACHE_CONTROL: &str = "public, max-age=3600, stale-while-revalidate";

/// Outer bound on any request to this process. Wider than the CMS client
/// timeout so upstream timeouts surface as 504 from the proxy handler,
/// not as a generic cutoff here.
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<QueryCache>,
    pub graphql: Arc<GraphqlClient>,
    pub content: Arc<ContentDir>,
    pub home: Arc<HomeStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires every capability from settings, rooted at `dir`.
    pub async fn from_settings(dir: &FsPath, settings: &Settings) -> crate::Result<Self> {
        let graphql = Arc::new(GraphqlClient::new(
            settings.cms.endpoint.clone(),
            Duration::from_secs(settings.cms.timeout_secs),
        )?);
        let cache = Arc::new(QueryCache::new(graphql.clone()));
        let content = Arc::new(ContentDir::new(dir.join(&settings.content.dir)));
        let home = Arc::new(
            HomeStore::open(cache.clone(), dir.join(&settings.content.home_overrides)).await?,
        );
        let auth = Arc::new(AuthService::new(
            dir.join(&settings.auth.users),
            settings.auth.token_ttl_hours,
        ));

        Ok(Self {
            cache,
            graphql,
            content,
            home,
            auth,
        })
    }
}

pub fn build(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/home-content", put(put_home_content))
        .route_layer(middleware::from_fn_with_state(state.clone(), gate));

    Router::new()
        .route("/api/graphql", post(graphql_proxy))
        .route("/api/home-content", get(get_home_content))
        .route("/api/auth", post(login))
        .route("/{file}", get(static_content))
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async {
                    StatusCode::SERVICE_UNAVAILABLE
                }))
                .timeout(REQUEST_DEADLINE),
        )
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/graphql`: forwards the envelope to the CMS verbatim.
/// Upstream failures come back in GraphQL error shape so browser clients
/// have one format to handle.
async fn graphql_proxy(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    match state.graphql.forward(body).await {
        Ok(envelope) => Json(envelope).into_response(),
        Err(error) => {
            warn!(%error, "graphql proxy upstream failure");
            let message = error.to_string();
            let status = crate::Error::Fetch(error).to_status();
            (
                status,
                Json(json!({ "errors": [{ "message": message }] })),
            )
                .into_response()
        }
    }
}

/// `GET /{name}-content.json`
async fn static_content(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let Some(name) = file.strip_suffix("-content.json") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match state.content.read_json(name).await {
        Some(doc) => Json(doc).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `GET /api/home-content`: cache-and-network. The current document goes
/// out immediately; a CMS refresh runs detached, ordered at this request's
/// start, and lands for the next reader.
async fn get_home_content(State(state): State<AppState>) -> Response {
    let doc = state.home.current();
    // Ticket drawn here, not in the task: the spawn may not be polled
    // until after a later request has already begun.
    let ticket = state.home.begin_refresh();
    let home = state.home.clone();
    tokio::spawn(async move { home.refresh(ticket).await });

    (
        [(header::CACHE_CONTROL, HOME_CACHE_CONTROL)],
        Json((*doc).clone()),
    )
        .into_response()
}

/// `PUT /api/home-content` (authenticated via [`gate`]). The body is
/// parsed by hand so a syntax error reports through the same validation
/// envelope as a shape-invalid document, instead of an extractor 400.
async fn put_home_content(State(state): State<AppState>, body: String) -> Response {
    let result = match serde_json::from_str::<Value>(&body) {
        Ok(doc) => state.home.update(doc).await,
        Err(error) => Err(crate::Error::Validation(error.to_string())),
    };
    match result {
        Ok(outcome) => Json(json!({ "success": true, "persisted": outcome.persisted })).into_response(),
        Err(error) => {
            let status = error.to_status();
            (
                status,
                Json(json!({ "success": false, "message": error.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// `POST /api/auth`: token in the body for API callers, session cookie
/// for the browser admin.
async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    match state.auth.login(&body.username, &body.password).await {
        Some(token) => {
            let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; Max-Age=86400");
            (
                [(header::SET_COOKIE, cookie)],
                Json(json!({ "success": true, "token": token })),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "invalid credentials" })),
        )
            .into_response(),
    }
}
