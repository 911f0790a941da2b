// crates/edge/src/auth.rs

//! Bearer/cookie authentication for admin surfaces.
//!
//! Tokens are opaque, held in memory, and expire after a settings-driven
//! TTL. The user list is a small JSON file of argon2 hashes, re-read on
//! every login so an operator can rotate credentials without a restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use domain::security::password::verify_password;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::router::AppState;

pub const SESSION_COOKIE: &str = "meridian_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

pub struct AuthService {
    users_path: PathBuf,
    ttl: Duration,
    tokens: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AuthService {
    pub fn new(users_path: PathBuf, ttl_hours: i64) -> Self {
        Self {
            users_path,
            ttl: Duration::hours(ttl_hours),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Issues an opaque token for a correct username/password pair.
    pub async fn login(&self, username: &str, password: &str) -> Option<String> {
        let users = match read_users(&self.users_path).await {
            Ok(users) => users,
            Err(error) => {
                warn!(%error, "user list unavailable");
                return None;
            }
        };
        let user = users.iter().find(|u| u.username == username)?;
        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(error) => {
                warn!(username, %error, "stored password hash unusable");
                return None;
            }
        }

        let token = Uuid::new_v4().to_string();
        self.tokens
            .lock()
            .insert(token.clone(), Utc::now() + self.ttl);
        info!(username, "admin login");
        Some(token)
    }

    /// True for a known, unexpired token. Expired tokens are purged as
    /// they are seen.
    pub fn verify(&self, token: &str) -> bool {
        let mut tokens = self.tokens.lock();
        match tokens.get(token) {
            Some(expiry) if *expiry > Utc::now() => true,
            Some(_) => {
                tokens.remove(token);
                false
            }
            None => false,
        }
    }
}

async fn read_users(path: &Path) -> anyhow::Result<Vec<UserRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading users from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing users at {}", path.display()))
}

/// Admin route gate: a bearer header or the session cookie must carry a
/// live token.
pub async fn gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = bearer_token(&request)
        .or_else(|| cookie_token(&request))
        .is_some_and(|token| state.auth.verify(&token));

    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

fn cookie_token(request: &Request) -> Option<String> {
    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_owned())
    })
}
