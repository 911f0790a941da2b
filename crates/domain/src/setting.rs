// crates/domain/src/setting.rs

use crate::seo::SeoDefaults;
use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds.
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: [127, 0, 0, 1].into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
    /// WPGraphQL endpoint; empty means no CMS is wired and every primary
    /// fetch fails over to its static fallback.
    pub endpoint: String,

    /// Outbound request bound in seconds. The reference deployment bounds
    /// proxy calls at 26 seconds.
    pub timeout_secs: u64,
}

impl Default for CmsSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 26,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Directory holding the `<name>-content.json` documents.
    pub dir: PathBuf,

    /// Admin-edited home document; absent until the first PUT persists.
    pub home_overrides: PathBuf,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content"),
            home_overrides: PathBuf::from("content/home-overrides.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeoSettings {
    pub base_url: String,
    pub site_name: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub twitter_handle: Option<String>,
}

impl Default for SeoSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_owned(),
            site_name: "Meridian".to_owned(),
            title: "Meridian".to_owned(),
            description: "Technology consulting from strategy to production.".to_owned(),
            image: "/images/og-default.png".to_owned(),
            twitter_handle: None,
        }
    }
}

impl SeoSettings {
    pub fn as_defaults(&self) -> SeoDefaults {
        SeoDefaults {
            base_url: self.base_url.clone(),
            site_name: self.site_name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            twitter_handle: self.twitter_handle.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// JSON array of `{ "username": ..., "password_hash": ... }` records.
    pub users: PathBuf,

    pub token_ttl_hours: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            users: PathBuf::from("auth/users.json"),
            token_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrerenderSettings {
    pub routes_out: PathBuf,
    pub sitemap_out: PathBuf,
}

impl Default for PrerenderSettings {
    fn default() -> Self {
        Self {
            routes_out: PathBuf::from("prerender-routes.txt"),
            sitemap_out: PathBuf::from("sitemap.xml"),
        }
    }
}

/// Full settings tree. Every field defaults, so an empty `meridian.toml`
/// (or none at all) still boots.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cms: CmsSettings,
    pub content: ContentSettings,
    pub seo: SeoSettings,
    pub auth: AuthSettings,
    pub prerender: PrerenderSettings,
}
