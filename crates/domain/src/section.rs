// crates/domain/src/section.rs

//! Home-page document model.
//!
//! The editable home document is an ordered list of sections; the `kind`
//! field selects the variant. Kinds this build does not know about
//! deserialize to [`HomeSection::Unknown`] so an edited document can never
//! make rendering partial — consumers match exhaustively and skip
//! `Unknown` instead of guessing at a shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HomeSection {
    Hero {
        #[serde(default)]
        heading: String,
        #[serde(default)]
        subheading: String,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        cta: Option<SectionLink>,
    },
    Intro {
        #[serde(default)]
        heading: String,
        #[serde(default)]
        body: String,
    },
    Services {
        #[serde(default)]
        heading: String,
        #[serde(default)]
        items: Vec<SectionCard>,
    },
    Industries {
        #[serde(default)]
        heading: String,
        #[serde(default)]
        items: Vec<SectionCard>,
    },
    /// Drives the featured strip: ordered preferred slugs plus an optional
    /// result bound, resolved against live case-study content.
    FeaturedCaseStudies {
        #[serde(default)]
        heading: String,
        #[serde(default)]
        slugs: Vec<String>,
        #[serde(default)]
        max: Option<usize>,
    },
    Testimonials {
        #[serde(default)]
        quotes: Vec<Quote>,
    },
    CallToAction {
        #[serde(default)]
        heading: String,
        #[serde(default)]
        link: Option<SectionLink>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionLink {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionCard {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attribution: String,
}

/// The full editable home document: ordered sections plus the SEO fields
/// an admin can override per page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HomeDocument {
    #[serde(default)]
    pub sections: Vec<HomeSection>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
}
