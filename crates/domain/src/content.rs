// crates/domain/src/content.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};

/// Editorial content classification.
///
/// The type decides the public link prefix and the fallback artwork used
/// when a payload carries no image of its own; everything else about an
/// item lives in its fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentType {
    Post,
    CaseStudy,
}

impl ContentType {
    pub fn link_prefix(&self) -> &'static str {
        match self {
            ContentType::Post => "/blog/",
            ContentType::CaseStudy => "/case-studies/",
        }
    }

    /// Site-relative artwork used when neither the detail bag nor the
    /// featured image yields a URL.
    pub fn default_image(&self) -> &'static str {
        match self {
            ContentType::Post => "/images/blog-card-default.png",
            ContentType::CaseStudy => "/images/case-study-card-default.png",
        }
    }
}

/// Featured-media reference, resolved exactly once at the ingestion
/// boundary.
///
/// CMS payloads carry media as a bare URL string, as a
/// `{ node: { sourceUrl, altText } }` wrapper, as an unwrapped
/// `{ sourceUrl, altText }` object, or not at all. Downstream code only
/// ever sees this tagged form and never re-probes the raw shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaRef {
    None,
    Url(String),
    Node {
        url: Option<String>,
        alt: Option<String>,
    },
}

impl MediaRef {
    /// Total over every shape the CMS emits. Absent and `null` values map
    /// to `None`, strings to `Url`, objects are searched for a node with a
    /// `sourceUrl`, and anything else maps to `None`.
    pub fn from_json(value: Option<&Json>) -> MediaRef {
        match value {
            None | Some(Json::Null) => MediaRef::None,
            Some(Json::String(url)) => MediaRef::Url(url.clone()),
            Some(Json::Object(obj)) => {
                let node = match obj.get("node") {
                    Some(Json::Object(node)) => node,
                    // ACF image fields skip the node wrapper.
                    _ if obj.contains_key("sourceUrl") => obj,
                    _ => return MediaRef::None,
                };
                MediaRef::Node {
                    url: node
                        .get("sourceUrl")
                        .and_then(Json::as_str)
                        .map(str::to_owned),
                    alt: node
                        .get("altText")
                        .and_then(Json::as_str)
                        .map(str::to_owned),
                }
            }
            Some(_) => MediaRef::None,
        }
    }

    /// The URL to display, if any shape carried one.
    pub fn display_url(&self) -> Option<&str> {
        match self {
            MediaRef::None => None,
            MediaRef::Url(url) => Some(url.as_str()),
            MediaRef::Node { url, .. } => url.as_deref(),
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            MediaRef::Node { alt, .. } => alt.as_deref(),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, MediaRef::None)
    }
}

/// Category or tag reference, always embedded in a content payload and
/// never stored independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermRef {
    pub name: String,
    pub slug: String,
}

/// One editorial entity (blog post or case study) as resolved from a CMS
/// payload.
///
/// The id is CMS-assigned and immutable; the slug is unique within a
/// content type. `detail` is the type-specific ACF field bag whose shape
/// varies by content type and is not statically fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub content_type: ContentType,
    pub title: String,
    pub slug: String,
    /// Publication timestamp. Malformed CMS dates land here as `None`.
    pub date: Option<NaiveDateTime>,
    /// Raw HTML excerpt as delivered; cleaned at mapping time.
    pub excerpt: String,
    pub media: MediaRef,
    pub categories: Vec<TermRef>,
    pub tags: Vec<TermRef>,
    pub detail: JsonMap<String, Json>,
}

impl ContentItem {
    pub fn link_path(&self) -> String {
        format!("{}{}", self.content_type.link_prefix(), self.slug)
    }

    pub fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }
}
