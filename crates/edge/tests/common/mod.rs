#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use domain::setting::Settings;
use edge::router::{self, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // oneshot

pub const ADMIN_USER: &str = "editor";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

// === Stub CMS ===

/// Canned WPGraphQL responses, dispatched on the operation name inside
/// the forwarded document. Unscripted queries answer with a GraphQL
/// error envelope, the way a misconfigured upstream would.
#[derive(Clone, Default)]
pub struct CmsScript {
    pub home: Option<Value>,
    pub posts: Option<Value>,
    pub case_studies: Option<Value>,
    pub post_slugs: Option<Value>,
    pub case_study_slugs: Option<Value>,
    /// Per-request latency, for racing requests against a slow upstream.
    pub delay: Option<Duration>,
    /// Requests answered so far, scripted or not.
    pub hits: Arc<AtomicUsize>,
}

async fn answer(State(script): State<Arc<CmsScript>>, Json(envelope): Json<Value>) -> Json<Value> {
    script
        .hits
        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    if let Some(delay) = script.delay {
        tokio::time::sleep(delay).await;
    }

    let query = envelope["query"].as_str().unwrap_or_default();
    let scripted = [
        ("query HomeContent", &script.home),
        ("query Posts(", &script.posts),
        ("query CaseStudies(", &script.case_studies),
        ("query PostSlugs(", &script.post_slugs),
        ("query CaseStudySlugs(", &script.case_study_slugs),
    ];
    for (marker, data) in scripted {
        if query.contains(marker) {
            if let Some(data) = data {
                return Json(json!({ "data": data }));
            }
        }
    }
    Json(json!({ "errors": [{ "message": "unscripted query" }] }))
}

/// Binds the stub on an ephemeral port; the serve task lives for the
/// rest of the test process.
pub async fn spawn_cms(script: CmsScript) -> String {
    let app = Router::new()
        .route("/graphql", post(answer))
        .with_state(Arc::new(script));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/graphql")
}

/// An endpoint with nothing listening behind it.
pub async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/graphql")
}

pub fn post_node(id: &str, slug: &str, title: &str, date: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": title,
        "date": date,
        "excerpt": format!("<p>{title} excerpt</p>"),
        "featuredImage": null,
        "categories": { "nodes": [] },
        "tags": { "nodes": [] },
    })
}

pub fn case_study_node(
    id: &str,
    slug: &str,
    title: &str,
    date: &str,
    categories: &[&str],
) -> Value {
    let terms: Vec<Value> = categories
        .iter()
        .map(|slug| json!({ "name": slug, "slug": slug }))
        .collect();
    json!({
        "id": id,
        "slug": slug,
        "title": title,
        "date": date,
        "excerpt": format!("<p>{title} summary</p>"),
        "featuredImage": null,
        "categories": { "nodes": terms },
        "caseStudyFields": { "client": format!("{title} Co"), "industry": "Technology" },
    })
}

// === Site scaffold ===

/// Lays out a site directory the way an operator would: static content
/// documents plus one admin user with a real password hash.
pub fn scaffold_site(dir: &Path) {
    let content = dir.join("content");
    std::fs::create_dir_all(&content).unwrap();
    write_doc(
        &content,
        "services",
        json!({
            "heading": "Services",
            "items": [
                { "slug": "ai-strategy", "title": "AI Strategy" },
                { "slug": "ml-engineering", "title": "ML Engineering" },
            ]
        }),
    );
    write_doc(
        &content,
        "industries",
        json!({
            "heading": "Industries",
            "items": [ { "slug": "healthcare", "title": "Healthcare" } ]
        }),
    );
    write_doc(
        &content,
        "about",
        json!({ "heading": "About us", "body": "We ship AI systems." }),
    );
    write_doc(
        &content,
        "navbar",
        json!({ "links": [ { "label": "Home", "href": "/" } ] }),
    );

    let auth = dir.join("auth");
    std::fs::create_dir_all(&auth).unwrap();
    let hash = domain::security::password::hash_password(ADMIN_PASSWORD).unwrap();
    std::fs::write(
        auth.join("users.json"),
        json!([{ "username": ADMIN_USER, "password_hash": hash }]).to_string(),
    )
    .unwrap();
}

fn write_doc(content: &Path, name: &str, doc: Value) {
    std::fs::write(content.join(format!("{name}-content.json")), doc.to_string()).unwrap();
}

/// Builds the app the same way `meridian serve` does, pointed at the
/// given CMS endpoint.
pub async fn build_app(dir: &Path, endpoint: &str) -> Router {
    let mut settings = Settings::default();
    settings.cms.endpoint = endpoint.to_owned();
    settings.cms.timeout_secs = 2;
    let state = AppState::from_settings(dir, &settings).await.unwrap();
    router::build(state)
}

/// Scaffolded site plus app wired to a scripted CMS.
pub async fn site_with(script: CmsScript) -> (TempDir, Router) {
    let tmp = TempDir::new().unwrap();
    scaffold_site(tmp.path());
    let endpoint = spawn_cms(script).await;
    let app = build_app(tmp.path(), &endpoint).await;
    (tmp, app)
}

// === Small IO helpers ===

pub async fn read(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get_response(app: &Router, path: &str) -> Response {
    let req = Request::get(path).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    read(get_response(app, path).await).await
}

pub async fn post_json_response(app: &Router, path: &str, body: Value) -> Response {
    let req = Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    read(post_json_response(app, path, body).await).await
}

pub async fn put_json(
    app: &Router,
    path: &str,
    body: Value,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    put_raw(app, path, &body.to_string(), headers).await
}

/// PUT with an arbitrary body, for payloads `json!` cannot produce.
pub async fn put_raw(
    app: &Router,
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut req = Request::put(path).header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    let resp = app
        .clone()
        .oneshot(req.body(Body::from(body.to_owned())).unwrap())
        .await
        .unwrap();
    read(resp).await
}

/// Logs in as the scaffolded admin and hands back the bearer token.
pub async fn login_token(app: &Router) -> String {
    let (status, body) = post_json(
        app,
        "/api/auth",
        json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_owned()
}
