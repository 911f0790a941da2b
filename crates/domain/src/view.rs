// crates/domain/src/view.rs

//! Page-facing view models.
//!
//! Built once per resolution cycle by the mappers, consumed by the
//! presentation layer, never mutated afterwards — a fresher resolution
//! produces a new value rather than editing one in place. None of these
//! hold a reference back to the resolver.

use crate::section::HomeSection;
use serde::Serialize;

/// Card for a blog post in list and grid displays.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceCard {
    pub title: String,
    pub href: String,
    pub image_url: String,
    pub image_alt: String,
    pub category: String,
    pub date_display: String,
    pub description: String,
    pub reading_minutes: u32,
}

/// Card for a case study in list, grid, and featured displays.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CaseStudyCard {
    pub title: String,
    pub href: String,
    pub image_url: String,
    pub image_alt: String,
    pub client: String,
    pub industry: String,
    pub date_display: String,
    pub description: String,
}

/// Bounded, ordered strip of featured case studies.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FeaturedStrip {
    pub heading: String,
    pub cards: Vec<CaseStudyCard>,
}

/// Fully-formed home page: document sections in order with the featured
/// strip already selected against live content.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HomeView {
    pub sections: Vec<HomeSection>,
    pub featured: FeaturedStrip,
}
