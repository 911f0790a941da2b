// crates/edge/src/prerender.rs

//! Build-time route generation for the prerenderer.

use std::collections::HashSet;

use domain::error::FetchError;
use serde_json::{json, Value as Json};
use serve::ingest;
use serve::seo::canonical_url;
use serve::source::{QueryClient, StaticSource};
use tracing::warn;

/// Engagement funnels are code, not CMS content; their routes are fixed.
pub const ENGAGEMENT_ROUTES: &[&str] = &[
    "/engagements/ai-readiness-assessment",
    "/engagements/proof-of-concept",
    "/engagements/production-scale",
];

const FIXED_ROUTES: &[&str] = &[
    "/",
    "/about",
    "/contact",
    "/resources",
    "/blog",
    "/case-studies",
    "/services",
    "/industries",
    "/engagements",
];

const SLUG_PAGE_SIZE: u64 = 100;

/// Collects every prerenderable path, in stable order, deduplicated.
///
/// Post slugs are the primary query: a failure there fails the whole
/// run. Case-study and static-document lookups degrade to empty lists,
/// so a partial outage narrows the route list instead of blocking a
/// build.
pub async fn collect_routes(
    client: &dyn QueryClient,
    content: &dyn StaticSource,
) -> Result<Vec<String>, FetchError> {
    let mut routes: Vec<String> = FIXED_ROUTES.iter().map(|r| (*r).to_owned()).collect();
    routes.extend(ENGAGEMENT_ROUTES.iter().map(|r| (*r).to_owned()));

    // Primary: blog posts.
    let posts = client
        .execute("post_slugs", json!({ "first": SLUG_PAGE_SIZE }))
        .await?;
    for slug in ingest::slugs(&posts, "posts") {
        routes.push(format!("/blog/{slug}"));
    }

    match client
        .execute("case_study_slugs", json!({ "first": SLUG_PAGE_SIZE }))
        .await
    {
        Ok(payload) => {
            for slug in ingest::slugs(&payload, "caseStudies") {
                routes.push(format!("/case-studies/{slug}"));
            }
        }
        Err(error) => warn!(%error, "case-study slugs unavailable; omitting their routes"),
    }

    routes.extend(document_routes(content, "services", "/services").await);
    routes.extend(document_routes(content, "industries", "/industries").await);

    let mut seen = HashSet::new();
    routes.retain(|route| seen.insert(route.clone()));
    Ok(routes)
}

/// Newline-delimited route list, the format the prerender step consumes.
pub fn routes_file(routes: &[String]) -> String {
    let mut out = routes.join("\n");
    out.push('\n');
    out
}

/// Minimal sitemap: one `<url>` per route, absolutized against the site
/// base URL.
pub fn sitemap_xml(routes: &[String], base_url: &str) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for route in routes {
        let loc = canonical_url(base_url, Some(route));
        out.push_str("  <url><loc>");
        out.push_str(&html_escape::encode_text(&loc));
        out.push_str("</loc></url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

async fn document_routes(content: &dyn StaticSource, name: &str, prefix: &str) -> Vec<String> {
    match content.load(name).await {
        Ok(Some(doc)) => item_slugs(&doc)
            .into_iter()
            .map(|slug| format!("{prefix}/{slug}"))
            .collect(),
        Ok(None) => Vec::new(),
        Err(error) => {
            warn!(name, %error, "static document unavailable; omitting its routes");
            Vec::new()
        }
    }
}

fn item_slugs(doc: &Json) -> Vec<String> {
    doc.get("items")
        .and_then(Json::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("slug").and_then(Json::as_str).map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ScriptedClient {
        case_studies_fail: bool,
    }

    #[async_trait]
    impl QueryClient for ScriptedClient {
        async fn execute(&self, name: &str, _variables: Json) -> Result<Json, FetchError> {
            match name {
                "post_slugs" => Ok(json!({
                    "posts": { "nodes": [ { "slug": "alpha" }, { "slug": "beta" } ] }
                })),
                "case_study_slugs" if self.case_studies_fail => {
                    Err(FetchError::Network("connection refused".to_owned()))
                }
                "case_study_slugs" => Ok(json!({
                    "caseStudies": { "nodes": [ { "slug": "fintech" } ] }
                })),
                _ => Err(FetchError::GraphQl(format!("unknown query: {name}"))),
            }
        }
    }

    struct DocSource;

    #[async_trait]
    impl StaticSource for DocSource {
        async fn load(&self, name: &str) -> Result<Option<Json>, FetchError> {
            match name {
                "services" => Ok(Some(json!({
                    "items": [ { "slug": "platform-engineering" }, { "slug": "data" } ]
                }))),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn collects_fixed_cms_and_document_routes() {
        let client = ScriptedClient {
            case_studies_fail: false,
        };
        let routes = collect_routes(&client, &DocSource).await.unwrap();

        for expected in [
            "/",
            "/blog",
            "/blog/alpha",
            "/blog/beta",
            "/case-studies/fintech",
            "/services/platform-engineering",
            "/engagements/proof-of-concept",
        ] {
            assert!(routes.iter().any(|r| r == expected), "missing {expected}");
        }
        // Industries doc is absent: only the fixed index route remains.
        assert!(routes.iter().all(|r| !r.starts_with("/industries/")));

        let unique: HashSet<&String> = routes.iter().collect();
        assert_eq!(unique.len(), routes.len());
    }

    #[tokio::test]
    async fn case_study_outage_narrows_the_list() {
        let client = ScriptedClient {
            case_studies_fail: true,
        };
        let routes = collect_routes(&client, &DocSource).await.unwrap();
        assert!(routes.iter().any(|r| r == "/case-studies"));
        assert!(routes.iter().all(|r| !r.starts_with("/case-studies/")));
    }

    #[tokio::test]
    async fn post_slug_failure_is_fatal() {
        struct FailingClient;

        #[async_trait]
        impl QueryClient for FailingClient {
            async fn execute(&self, _name: &str, _variables: Json) -> Result<Json, FetchError> {
                Err(FetchError::Timeout)
            }
        }

        let err = collect_routes(&FailingClient, &DocSource).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[test]
    fn sitemap_absolutizes_and_escapes() {
        let routes = vec!["/blog/fish-&-chips".to_owned()];
        let xml = sitemap_xml(&routes, "https://example.com");
        assert!(xml.contains("<loc>https://example.com/blog/fish-&amp;-chips</loc>"));
        assert!(xml.starts_with("<?xml"));
    }

    #[test]
    fn routes_file_is_newline_delimited() {
        let routes = vec!["/".to_owned(), "/blog".to_owned()];
        assert_eq!(routes_file(&routes), "/\n/blog\n");
    }
}
