// crates/serve/src/ingest.rs

//! WPGraphQL payload ingestion.
//!
//! Walks raw payloads into [`ContentItem`]s, normalizing media references
//! once at this boundary so nothing downstream re-probes raw JSON shapes.
//! Malformed nodes (missing id or slug) are skipped, never fatal.

use chrono::NaiveDateTime;
use domain::content::{ContentItem, ContentType, MediaRef, TermRef};
use serde_json::Value as Json;

const CASE_STUDY_DETAIL: &str = "caseStudyFields";

pub fn posts(payload: &Json) -> Vec<ContentItem> {
    collect(payload, "posts", ContentType::Post, None)
}

pub fn case_studies(payload: &Json) -> Vec<ContentItem> {
    collect(
        payload,
        "caseStudies",
        ContentType::CaseStudy,
        Some(CASE_STUDY_DETAIL),
    )
}

pub fn single_post(payload: &Json) -> Option<ContentItem> {
    item_from_node(payload.get("postBy")?, ContentType::Post, None)
}

pub fn single_case_study(payload: &Json) -> Option<ContentItem> {
    item_from_node(
        payload.get("caseStudy")?,
        ContentType::CaseStudy,
        Some(CASE_STUDY_DETAIL),
    )
}

/// Slug list from a `{ <root>: { nodes: [{ slug }] } }` payload.
pub fn slugs(payload: &Json, root: &str) -> Vec<String> {
    payload
        .get(root)
        .and_then(|r| r.get("nodes"))
        .and_then(Json::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|n| n.get("slug").and_then(Json::as_str).map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

fn collect(
    payload: &Json,
    root: &str,
    content_type: ContentType,
    detail_field: Option<&str>,
) -> Vec<ContentItem> {
    let Some(nodes) = payload
        .get(root)
        .and_then(|r| r.get("nodes"))
        .and_then(Json::as_array)
    else {
        return Vec::new();
    };
    nodes
        .iter()
        .filter_map(|node| item_from_node(node, content_type, detail_field))
        .collect()
}

pub fn item_from_node(
    node: &Json,
    content_type: ContentType,
    detail_field: Option<&str>,
) -> Option<ContentItem> {
    let id = node.get("id").and_then(Json::as_str)?.to_owned();
    let slug = node.get("slug").and_then(Json::as_str)?.to_owned();
    let title = node
        .get("title")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_owned();
    let date = node
        .get("date")
        .and_then(Json::as_str)
        .and_then(parse_cms_date);
    let excerpt = node
        .get("excerpt")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_owned();
    let media = MediaRef::from_json(node.get("featuredImage"));
    let categories = terms(node.get("categories"));
    let tags = terms(node.get("tags"));
    let detail = detail_field
        .and_then(|field| node.get(field))
        .and_then(Json::as_object)
        .cloned()
        .unwrap_or_default();

    Some(ContentItem {
        id,
        content_type,
        title,
        slug,
        date,
        excerpt,
        media,
        categories,
        tags,
        detail,
    })
}

fn terms(value: Option<&Json>) -> Vec<TermRef> {
    value
        .and_then(|v| v.get("nodes"))
        .and_then(Json::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|n| {
                    Some(TermRef {
                        name: n.get("name").and_then(Json::as_str)?.to_owned(),
                        slug: n.get("slug").and_then(Json::as_str)?.to_owned(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// WPGraphQL emits local naive timestamps (`2024-05-17T10:30:00`); feeds
/// occasionally carry full RFC 3339. Anything else becomes `None`, never
/// an error.
pub fn parse_cms_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}
