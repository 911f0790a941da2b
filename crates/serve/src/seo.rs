// crates/serve/src/seo.rs

//! Head-tag composition.
//!
//! Builds the complete tag set for a page from per-page config plus site
//! defaults. Composition is deterministic and idempotent: composing the
//! same config twice leaves the set unchanged.

use domain::seo::{MetaTag, MetaTagSet, PageKind, SeoDefaults, SeoMetaConfig};
use serde_json::json;

use crate::text::collapse_ws;

/// SERP description budget, ellipsis included.
pub const DESCRIPTION_LIMIT: usize = 155;
/// A space earlier than this would orphan most of the budget, so earlier
/// spaces lose to a hard cut.
const WORD_BOUNDARY_FLOOR: usize = 80;
const ELLIPSIS: &str = "...";

pub fn compose(config: &SeoMetaConfig, defaults: &SeoDefaults) -> MetaTagSet {
    let page_title = match config.title.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => defaults.title.as_str(),
    };
    let title = match config.title.as_deref() {
        Some(t) if !t.is_empty() => format!("{t} | {}", defaults.site_name),
        _ => defaults.title.clone(),
    };
    let description = compose_description(
        match config.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => defaults.description.as_str(),
        },
        config.keyphrase.as_deref(),
    );
    let canonical = canonical_url(&defaults.base_url, config.canonical_path.as_deref());
    let image = config.image.as_ref();
    let image_url = canonical_url(
        &defaults.base_url,
        Some(image.map_or(defaults.image.as_str(), |i| i.url.as_str())),
    );

    let mut tags = MetaTagSet::new();
    tags.upsert(MetaTag::Title(title.clone()));
    tags.upsert(MetaTag::named("description", &description));
    if let Some(keywords) = config.keywords.as_deref().filter(|k| !k.is_empty()) {
        tags.upsert(MetaTag::named("keywords", keywords));
    }
    tags.upsert(MetaTag::Canonical(canonical.clone()));

    tags.upsert(MetaTag::property("og:type", config.page_kind.og_type()));
    tags.upsert(MetaTag::property("og:title", &title));
    tags.upsert(MetaTag::property("og:description", &description));
    tags.upsert(MetaTag::property("og:url", &canonical));
    tags.upsert(MetaTag::property("og:image", &image_url));
    tags.upsert(MetaTag::property("og:image:type", mime_for(&image_url)));
    if let Some(alt) = image.and_then(|i| i.alt.as_deref()) {
        tags.upsert(MetaTag::property("og:image:alt", alt));
    }
    if let Some(width) = image.and_then(|i| i.width) {
        tags.upsert(MetaTag::property("og:image:width", width.to_string()));
    }
    if let Some(height) = image.and_then(|i| i.height) {
        tags.upsert(MetaTag::property("og:image:height", height.to_string()));
    }
    tags.upsert(MetaTag::property("og:site_name", &defaults.site_name));

    tags.upsert(MetaTag::named("twitter:card", "summary_large_image"));
    if let Some(handle) = defaults.twitter_handle.as_deref() {
        tags.upsert(MetaTag::named("twitter:site", handle));
    }
    tags.upsert(MetaTag::named("twitter:title", &title));
    tags.upsert(MetaTag::named("twitter:description", &description));
    tags.upsert(MetaTag::named("twitter:image", &image_url));

    tags.upsert(MetaTag::JsonLd(json_ld(
        config.page_kind,
        defaults,
        page_title,
        &description,
        &canonical,
        &image_url,
    )));

    tags
}

/// Prepends the keyphrase unless the description already mentions it
/// (case-insensitive), then applies the length budget.
pub fn compose_description(description: &str, keyphrase: Option<&str>) -> String {
    let description = collapse_ws(description);
    let lead = match keyphrase {
        Some(kp)
            if !kp.trim().is_empty()
                && !description.to_lowercase().contains(&kp.to_lowercase()) =>
        {
            format!("{kp}. {description}")
        }
        _ => description,
    };
    truncate_description(&lead)
}

/// Cuts to the description budget. The cut lands on the last space when
/// that space falls late enough to keep most of the text; otherwise it is
/// a hard cut. `...` is appended whenever anything was dropped.
pub fn truncate_description(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= DESCRIPTION_LIMIT {
        return text.to_owned();
    }
    let keep = DESCRIPTION_LIMIT - ELLIPSIS.len();
    let head = &chars[..keep];
    let cut = head
        .iter()
        .rposition(|c| *c == ' ')
        .filter(|at| *at >= WORD_BOUNDARY_FLOOR)
        .unwrap_or(keep);
    let mut out: String = head[..cut].iter().collect();
    out.push_str(ELLIPSIS);
    out
}

/// Absolute URL for a page path. Scheme-prefixed input passes through
/// untouched; anything else joins the base origin with exactly one `/`.
pub fn canonical_url(base: &str, path: Option<&str>) -> String {
    let path = path.unwrap_or("/");
    if looks_absolute(path) {
        return path.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":".
fn looks_absolute(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// MIME type for an image URL by extension. Query strings and fragments
/// are ignored; unrecognized or absent extensions default to `image/png`.
pub fn mime_for(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "image/png",
    }
}

fn json_ld(
    kind: PageKind,
    defaults: &SeoDefaults,
    page_title: &str,
    description: &str,
    canonical: &str,
    image_url: &str,
) -> String {
    let body = match kind {
        PageKind::Website => json!({
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": defaults.site_name,
            "url": defaults.base_url,
            "logo": image_url,
        }),
        PageKind::Article => json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": page_title,
            "description": description,
            "image": image_url,
            "mainEntityOfPage": canonical,
            "publisher": { "@type": "Organization", "name": defaults.site_name },
        }),
    };
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::seo::SeoImage;

    fn defaults() -> SeoDefaults {
        SeoDefaults {
            base_url: "https://example.com".to_owned(),
            site_name: "Meridian".to_owned(),
            title: "Meridian Consulting".to_owned(),
            description: "Technology consulting for regulated industries.".to_owned(),
            image: "/images/og-default.png".to_owned(),
            twitter_handle: Some("@meridian".to_owned()),
        }
    }

    #[test]
    fn keyphrase_prepends_unless_already_present() {
        assert_eq!(compose_description("short text", Some("AI")), "AI. short text");
        assert_eq!(
            compose_description("Our AI strategy work", Some("ai")),
            "Our AI strategy work"
        );
        assert_eq!(compose_description("short text", None), "short text");
    }

    #[test]
    fn long_descriptions_cut_on_a_late_word_boundary() {
        // 40 x "word " = 200 chars; last space inside the 152-char keep
        // window sits at index 149.
        let text = "word ".repeat(40);
        let out = compose_description(&text, None);
        assert!(out.chars().count() <= DESCRIPTION_LIMIT);
        assert!(out.ends_with("..."));
        assert!(out.trim_end_matches("...").ends_with("word"));
    }

    #[test]
    fn early_space_only_forces_a_hard_cut() {
        let text = format!("ab {}", "x".repeat(170));
        let out = truncate_description(&text);
        assert_eq!(out.chars().count(), DESCRIPTION_LIMIT);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn canonical_join_inserts_exactly_one_slash() {
        assert_eq!(
            canonical_url("https://example.com/", Some("/about")),
            "https://example.com/about"
        );
        assert_eq!(
            canonical_url("https://example.com", Some("about")),
            "https://example.com/about"
        );
        assert_eq!(canonical_url("https://example.com", None), "https://example.com/");
    }

    #[test]
    fn scheme_prefixed_paths_pass_through() {
        assert_eq!(
            canonical_url("https://example.com", Some("https://other.org/x")),
            "https://other.org/x"
        );
        // A colon alone is not a scheme.
        assert_eq!(
            canonical_url("https://example.com", Some("blog/post:1")),
            "https://example.com/blog/post:1"
        );
    }

    #[test]
    fn mime_table_defaults_to_png() {
        assert_eq!(mime_for("https://cdn.example.com/a.JPG?width=100"), "image/jpeg");
        assert_eq!(mime_for("/images/hero.webp"), "image/webp");
        assert_eq!(mime_for("/images/logo.svg"), "image/svg+xml");
        assert_eq!(mime_for("/images/photo"), "image/png");
        assert_eq!(mime_for("/images/archive.zip"), "image/png");
    }

    #[test]
    fn compose_emits_a_complete_head_and_is_idempotent() {
        let config = SeoMetaConfig {
            title: Some("Case Studies".to_owned()),
            description: Some("Selected client engagements.".to_owned()),
            canonical_path: Some("/case-studies".to_owned()),
            image: Some(SeoImage::url_only("/images/case-studies.jpg")),
            keywords: Some("consulting, delivery".to_owned()),
            keyphrase: Some("Consulting".to_owned()),
            page_kind: PageKind::Website,
        };
        let defaults = defaults();

        let first = compose(&config, &defaults);
        let second = compose(&config, &defaults);
        assert_eq!(first, second);

        assert_eq!(
            first.get("title").map(MetaTag::content),
            Some("Case Studies | Meridian")
        );
        assert_eq!(
            first.get("canonical").map(MetaTag::content),
            Some("https://example.com/case-studies")
        );
        assert_eq!(
            first.get("property:og:url").map(MetaTag::content),
            first.get("canonical").map(MetaTag::content)
        );
        assert_eq!(
            first.get("property:og:image").map(MetaTag::content),
            Some("https://example.com/images/case-studies.jpg")
        );
        assert_eq!(
            first.get("property:og:image:type").map(MetaTag::content),
            Some("image/jpeg")
        );
        assert_eq!(
            first.get("name:twitter:card").map(MetaTag::content),
            Some("summary_large_image")
        );
        assert_eq!(
            first.get("name:description").map(MetaTag::content),
            Some("Consulting. Selected client engagements.")
        );
    }

    #[test]
    fn empty_config_falls_back_to_site_defaults() {
        let tags = compose(&SeoMetaConfig::default(), &defaults());
        assert_eq!(
            tags.get("title").map(MetaTag::content),
            Some("Meridian Consulting")
        );
        assert_eq!(
            tags.get("canonical").map(MetaTag::content),
            Some("https://example.com/")
        );
        assert_eq!(
            tags.get("property:og:image").map(MetaTag::content),
            Some("https://example.com/images/og-default.png")
        );
        assert_eq!(
            tags.get("name:twitter:site").map(MetaTag::content),
            Some("@meridian")
        );
    }

    #[test]
    fn article_pages_emit_article_structured_data() {
        let config = SeoMetaConfig {
            title: Some("Scaling Retrieval".to_owned()),
            page_kind: PageKind::Article,
            ..SeoMetaConfig::default()
        };
        let tags = compose(&config, &defaults());
        let body = tags.get("jsonld").map(MetaTag::content).unwrap_or_default();
        assert!(body.contains("\"@type\":\"Article\""));
        assert!(body.contains("Scaling Retrieval"));
        assert_eq!(
            tags.get("property:og:type").map(MetaTag::content),
            Some("article")
        );
    }
}
