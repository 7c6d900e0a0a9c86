use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::http::{header, HeaderMap};
use log::{debug, info, warn};
use rand::RngCore;
use tokio::sync::RwLock;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "tinywiki_session";
const TOKEN_BYTES: usize = 32;
const FALLBACK_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct SessionRecord {
    username: String,
    expires_at: Instant,
}

/// In-process login sessions keyed by random tokens.
///
/// The token is the only thing the client holds; the username stays on the
/// server and is resolved on every request.
#[derive(Clone)]
pub struct SessionService {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionService {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `username` and return its token.
    pub async fn issue(&self, username: &str) -> String {
        let token = random_token();
        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl).unwrap_or_else(|| {
            warn!("Session lifetime {:?} overflows the clock, using {:?}", self.ttl, FALLBACK_TTL);
            now + FALLBACK_TTL
        });
        let record = SessionRecord { username: username.to_string(), expires_at };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, r| r.expires_at > Instant::now());
        sessions.insert(token.clone(), record);
        info!("Issued session for '{}' ({} active)", username, sessions.len());
        token
    }

    /// Username behind `token`, if the session exists and has not expired.
    pub async fn resolve(&self, token: &str) -> Option<String> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(record) if record.expires_at > Instant::now() => {
                    return Some(record.username.clone());
                }
                None => return None,
                Some(_) => {}
            }
        }
        debug!("Dropping expired session");
        self.sessions.write().await.remove(token);
        None
    }

    pub async fn revoke(&self, token: &str) {
        if let Some(record) = self.sessions.write().await.remove(token) {
            info!("Revoked session for '{}'", record.username);
        }
    }

    /// `Set-Cookie` value that stores `token` for the session lifetime.
    pub fn cookie_for(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            token,
            self.ttl.as_secs()
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
    }
}

/// Session token from the request's `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
