// crates/edge/src/queries.rs

//! WPGraphQL query documents.
//!
//! Documents are keyed by the short names the resolver plans with; the
//! client refuses names it does not know rather than forwarding free-form
//! strings upstream.

pub const HOME: &str = r#"
query HomeContent {
  page(id: "home", idType: URI) {
    id
    slug
    homeContent
  }
}
"#;

pub const POSTS: &str = r#"
query Posts($first: Int!) {
  posts(first: $first, where: { orderby: { field: DATE, order: DESC } }) {
    nodes {
      id
      slug
      title
      date
      excerpt
      featuredImage {
        node {
          sourceUrl
          altText
        }
      }
      categories {
        nodes {
          name
          slug
        }
      }
      tags {
        nodes {
          name
          slug
        }
      }
    }
  }
}
"#;

pub const POST_BY_SLUG: &str = r#"
query PostBySlug($slug: String!) {
  postBy(slug: $slug) {
    id
    slug
    title
    date
    excerpt
    content
    featuredImage {
      node {
        sourceUrl
        altText
      }
    }
    categories {
      nodes {
        name
        slug
      }
    }
    tags {
      nodes {
        name
        slug
      }
    }
  }
}
"#;

pub const CASE_STUDIES: &str = r#"
query CaseStudies($first: Int!) {
  caseStudies(first: $first, where: { orderby: { field: DATE, order: DESC } }) {
    nodes {
      id
      slug
      title
      date
      excerpt
      featuredImage {
        node {
          sourceUrl
          altText
        }
      }
      categories {
        nodes {
          name
          slug
        }
      }
      caseStudyFields {
        client
        industry
        summary
        cardImage {
          node {
            sourceUrl
            altText
          }
        }
        heroImage {
          node {
            sourceUrl
            altText
          }
        }
      }
    }
  }
}
"#;

pub const CASE_STUDY_BY_SLUG: &str = r#"
query CaseStudyBySlug($slug: ID!) {
  caseStudy(id: $slug, idType: SLUG) {
    id
    slug
    title
    date
    excerpt
    content
    featuredImage {
      node {
        sourceUrl
        altText
      }
    }
    categories {
      nodes {
        name
        slug
      }
    }
    caseStudyFields {
      client
      industry
      summary
      cardImage {
        node {
          sourceUrl
          altText
        }
      }
      heroImage {
        node {
          sourceUrl
          altText
        }
      }
    }
  }
}
"#;

pub const POST_SLUGS: &str = r#"
query PostSlugs($first: Int!) {
  posts(first: $first) {
    nodes {
      slug
    }
  }
}
"#;

pub const CASE_STUDY_SLUGS: &str = r#"
query CaseStudySlugs($first: Int!) {
  caseStudies(first: $first) {
    nodes {
      slug
    }
  }
}
"#;

pub const ABOUT_PAGE: &str = r#"
query AboutPage {
  page(id: "about", idType: URI) {
    id
    slug
    title
    content
  }
}
"#;

/// Document for a short query name. `None` for names no plan produces.
pub fn document(name: &str) -> Option<&'static str> {
    match name {
        "home" => Some(HOME),
        "posts" => Some(POSTS),
        "post_by_slug" => Some(POST_BY_SLUG),
        "case_studies" => Some(CASE_STUDIES),
        "case_study_by_slug" => Some(CASE_STUDY_BY_SLUG),
        "post_slugs" => Some(POST_SLUGS),
        "case_study_slugs" => Some(CASE_STUDY_SLUGS),
        "about_page" => Some(ABOUT_PAGE),
        _ => None,
    }
}
