// crates/serve/src/text.rs

//! Text shaping for CMS-delivered HTML fragments.

use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// The literal ellipsis marker WordPress appends to generated excerpts.
const CMS_ELLIPSIS: &str = "[&hellip;]";

pub fn strip_tags(html: &str) -> String {
    RE_TAG.replace_all(html, "").into_owned()
}

pub fn collapse_ws(text: &str) -> String {
    RE_WS.replace_all(text.trim(), " ").into_owned()
}

/// Strip tags, rewrite the CMS ellipsis marker to `...`, trim.
///
/// Idempotent: cleaning an already-clean string returns it unchanged, so
/// this never decodes entities beyond the one literal marker (a decoded
/// pass over re-encoded text would not be stable).
pub fn clean_excerpt(html: &str) -> String {
    strip_tags(html).replace(CMS_ELLIPSIS, "...").trim().to_owned()
}

/// Estimated minutes at 200 words per minute, rounded up.
///
/// Empty content reads in 0 minutes; any non-empty content reads in at
/// least 1.
pub fn reading_time(html: &str) -> u32 {
    let words = strip_tags(html).split_whitespace().count();
    words.div_ceil(200) as u32
}
