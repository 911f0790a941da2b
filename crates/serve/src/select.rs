// crates/serve/src/select.rs

//! Curated selection with recency backfill.
//!
//! Editors pin items by slug; whatever the pin list does not cover is
//! filled from the remaining candidates, newest first. Unknown slugs are
//! skipped silently so a stale pin never blanks a page.

use std::collections::HashSet;

use domain::content::ContentItem;

/// Picks up to `max` items: pinned slugs first, in pin order, then the
/// newest remaining candidates. Each item appears at most once even if a
/// slug is pinned twice.
pub fn select<'a>(
    candidates: &'a [ContentItem],
    preferred: &[String],
    max: usize,
) -> Vec<&'a ContentItem> {
    let mut picked: Vec<&ContentItem> = Vec::with_capacity(max);
    let mut seen: HashSet<&str> = HashSet::new();

    for slug in preferred {
        if picked.len() >= max {
            break;
        }
        if let Some(item) = candidates.iter().find(|c| &c.slug == slug) {
            if seen.insert(item.id.as_str()) {
                picked.push(item);
            }
        }
    }

    let mut rest: Vec<&ContentItem> = candidates
        .iter()
        .filter(|c| !seen.contains(c.id.as_str()))
        .collect();
    // Stable sort: undated items sink, ties keep candidate order.
    rest.sort_by(|a, b| b.date.cmp(&a.date));

    for item in rest {
        if picked.len() >= max {
            break;
        }
        if seen.insert(item.id.as_str()) {
            picked.push(item);
        }
    }

    picked
}

/// Items carrying a marker category, newest first. Menus assembled from
/// editorial markers rather than pinned slug lists use this path.
pub fn featured_by_marker<'a>(
    candidates: &'a [ContentItem],
    marker_slug: &str,
) -> Vec<&'a ContentItem> {
    let mut marked: Vec<&ContentItem> = candidates
        .iter()
        .filter(|c| c.has_category(marker_slug))
        .collect();
    marked.sort_by(|a, b| b.date.cmp(&a.date));
    marked
}
