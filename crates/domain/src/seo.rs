// crates/domain/src/seo.rs

use serde::{Deserialize, Serialize};

/// Per-page SEO input.
///
/// Constructed by whichever layer resolved the page, consumed immediately
/// by the composer, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoMetaConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Either a site-relative path or a full scheme-prefixed URL.
    pub canonical_path: Option<String>,
    pub image: Option<SeoImage>,
    pub keywords: Option<String>,
    /// When set and not already a case-insensitive substring of the
    /// description, the composer prepends it.
    pub keyphrase: Option<String>,
    #[serde(default)]
    pub page_kind: PageKind,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    #[default]
    Website,
    Article,
}

impl PageKind {
    pub fn og_type(&self) -> &'static str {
        match self {
            PageKind::Website => "website",
            PageKind::Article => "article",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoImage {
    pub url: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl SeoImage {
    pub fn url_only(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
            width: None,
            height: None,
        }
    }
}

/// Site-wide fallbacks, sourced from settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoDefaults {
    pub base_url: String,
    pub site_name: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub twitter_handle: Option<String>,
}

/// One rendered head entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaTag {
    Title(String),
    /// `<meta name=... content=...>`
    Named { name: String, content: String },
    /// `<meta property=... content=...>` (Open Graph)
    Property { property: String, content: String },
    /// `<link rel="canonical" href=...>`
    Canonical(String),
    /// `<script type="application/ld+json">` body
    JsonLd(String),
}

impl MetaTag {
    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        MetaTag::Named {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn property(property: impl Into<String>, content: impl Into<String>) -> Self {
        MetaTag::Property {
            property: property.into(),
            content: content.into(),
        }
    }

    /// Upsert key. A tag replaces any existing tag with the same key, so
    /// there is exactly one title, one canonical, one tag per name and per
    /// property.
    pub fn key(&self) -> String {
        match self {
            MetaTag::Title(_) => "title".to_owned(),
            MetaTag::Named { name, .. } => format!("name:{name}"),
            MetaTag::Property { property, .. } => format!("property:{property}"),
            MetaTag::Canonical(_) => "canonical".to_owned(),
            MetaTag::JsonLd(_) => "jsonld".to_owned(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            MetaTag::Title(t) => t,
            MetaTag::Named { content, .. } => content,
            MetaTag::Property { content, .. } => content,
            MetaTag::Canonical(href) => href,
            MetaTag::JsonLd(body) => body,
        }
    }
}

/// Ordered tag collection with idempotent writes.
///
/// Inserting a tag whose key already exists replaces it in place, so
/// composing the same config twice leaves the set unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTagSet {
    tags: Vec<MetaTag>,
}

impl MetaTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, tag: MetaTag) {
        let key = tag.key();
        match self.tags.iter_mut().find(|t| t.key() == key) {
            Some(slot) => *slot = tag,
            None => self.tags.push(tag),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaTag> {
        self.tags.iter().find(|t| t.key() == key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaTag> {
        self.tags.iter()
    }

    /// Deterministic `<head>` fragment in insertion order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for tag in &self.tags {
            match tag {
                MetaTag::Title(title) => {
                    out.push_str("<title>");
                    out.push_str(&html_escape::encode_text(title));
                    out.push_str("</title>\n");
                }
                MetaTag::Named { name, content } => {
                    out.push_str(&format!(
                        "<meta name=\"{}\" content=\"{}\">\n",
                        html_escape::encode_double_quoted_attribute(name),
                        html_escape::encode_double_quoted_attribute(content),
                    ));
                }
                MetaTag::Property { property, content } => {
                    out.push_str(&format!(
                        "<meta property=\"{}\" content=\"{}\">\n",
                        html_escape::encode_double_quoted_attribute(property),
                        html_escape::encode_double_quoted_attribute(content),
                    ));
                }
                MetaTag::Canonical(href) => {
                    out.push_str(&format!(
                        "<link rel=\"canonical\" href=\"{}\">\n",
                        html_escape::encode_double_quoted_attribute(href),
                    ));
                }
                MetaTag::JsonLd(body) => {
                    out.push_str("<script type=\"application/ld+json\">");
                    out.push_str(body);
                    out.push_str("</script>\n");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_in_place() {
        let mut set = MetaTagSet::new();
        set.upsert(MetaTag::named("description", "first"));
        set.upsert(MetaTag::property("og:title", "t"));
        set.upsert(MetaTag::named("description", "second"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("name:description").map(MetaTag::content), Some("second"));
        // Replacement keeps the original position.
        assert_eq!(set.iter().next().map(MetaTag::key), Some("name:description".into()));
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut set = MetaTagSet::new();
        set.upsert(MetaTag::Title("Page".into()));
        set.upsert(MetaTag::named("description", "d"));
        let once = set.clone();

        set.upsert(MetaTag::Title("Page".into()));
        set.upsert(MetaTag::named("description", "d"));
        assert_eq!(set, once);
    }

    #[test]
    fn render_escapes_attribute_values() {
        let mut set = MetaTagSet::new();
        set.upsert(MetaTag::named("description", "Fish & \"chips\""));
        let html = set.render();
        assert!(html.contains("Fish &amp; &quot;chips&quot;"));
        assert!(!html.contains("\"chips\""));
    }

    #[test]
    fn render_keeps_insertion_order() {
        let mut set = MetaTagSet::new();
        set.upsert(MetaTag::Title("T".into()));
        set.upsert(MetaTag::Canonical("https://example.com/".into()));
        set.upsert(MetaTag::property("og:title", "T"));
        let html = set.render();
        let title_at = html.find("<title>").unwrap();
        let canonical_at = html.find("rel=\"canonical\"").unwrap();
        let og_at = html.find("og:title").unwrap();
        assert!(title_at < canonical_at && canonical_at < og_at);
    }
}
