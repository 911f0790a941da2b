// crates/serve/src/mapper.rs

//! Content-item to view-model mapping.
//!
//! Everything here is total: missing dates, categories, images, and
//! detail fields degrade to fallbacks instead of erroring, so a thin CMS
//! payload still renders a complete card.

use chrono::NaiveDateTime;
use domain::content::{ContentItem, MediaRef};
use domain::section::{HomeDocument, HomeSection};
use domain::view::{CaseStudyCard, FeaturedStrip, HomeView, ResourceCard};
use serde_json::Value as Json;

use crate::select::select;
use crate::text::{clean_excerpt, reading_time};

/// Detail-bag image fields probed before the featured image, in
/// precedence order.
pub const POST_IMAGE_FIELDS: &[&str] = &["cardImage"];
pub const CASE_IMAGE_FIELDS: &[&str] = &["cardImage", "heroImage"];

const UNCATEGORIZED: &str = "Uncategorized";
const DEFAULT_FEATURED_MAX: usize = 3;

/// Human date like `17 May 2024`; absent or unparsed dates render empty
/// rather than erroring.
pub fn date_display(date: Option<&NaiveDateTime>) -> String {
    date.map(|d| d.format("%-d %B %Y").to_string())
        .unwrap_or_default()
}

/// First category name, or the fallback label when the CMS sent none.
pub fn category_label(item: &ContentItem) -> String {
    item.categories
        .first()
        .map(|term| term.name.clone())
        .unwrap_or_else(|| UNCATEGORIZED.to_owned())
}

/// Card artwork: detail-bag fields first, then the featured image, then
/// the per-type default. Alt text follows the image that won, falling
/// back to the item title.
pub fn card_image(item: &ContentItem, detail_fields: &[&str]) -> (String, String) {
    for field in detail_fields {
        let media = MediaRef::from_json(item.detail.get(*field));
        if let Some(url) = media.display_url() {
            let alt = media.alt().unwrap_or(&item.title).to_owned();
            return (url.to_owned(), alt);
        }
    }
    if let Some(url) = item.media.display_url() {
        let alt = item.media.alt().unwrap_or(&item.title).to_owned();
        return (url.to_owned(), alt);
    }
    (
        item.content_type.default_image().to_owned(),
        item.title.clone(),
    )
}

pub fn resource_card(item: &ContentItem) -> ResourceCard {
    let (image_url, image_alt) = card_image(item, POST_IMAGE_FIELDS);
    let description = clean_excerpt(&item.excerpt);
    let reading_minutes = reading_time(&description);
    ResourceCard {
        title: item.title.clone(),
        href: item.link_path(),
        image_url,
        image_alt,
        category: category_label(item),
        date_display: date_display(item.date.as_ref()),
        description,
        reading_minutes,
    }
}

pub fn case_study_card(item: &ContentItem) -> CaseStudyCard {
    let (image_url, image_alt) = card_image(item, CASE_IMAGE_FIELDS);
    CaseStudyCard {
        title: item.title.clone(),
        href: item.link_path(),
        image_url,
        image_alt,
        client: detail_str(item, "client"),
        industry: detail_str(item, "industry"),
        date_display: date_display(item.date.as_ref()),
        description: clean_excerpt(&item.excerpt),
    }
}

fn detail_str(item: &ContentItem, field: &str) -> String {
    item.detail
        .get(field)
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Assembles the home page: sections pass through as authored, and the
/// first featured-case-studies section drives the curated strip.
pub fn home_view(doc: &HomeDocument, candidates: &[ContentItem]) -> HomeView {
    let featured = doc
        .sections
        .iter()
        .find_map(|section| match section {
            HomeSection::FeaturedCaseStudies {
                heading,
                slugs,
                max,
            } => {
                let limit = max.unwrap_or(DEFAULT_FEATURED_MAX);
                let cards = select(candidates, slugs, limit)
                    .into_iter()
                    .map(case_study_card)
                    .collect();
                Some(FeaturedStrip {
                    heading: heading.clone(),
                    cards,
                })
            }
            _ => None,
        })
        .unwrap_or_else(|| FeaturedStrip {
            heading: String::new(),
            cards: Vec::new(),
        });

    HomeView {
        sections: doc.sections.clone(),
        featured,
    }
}
