//! Admin sessions: an in-memory token cache plus the cookie that carries it.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::AppError;
use crate::handlers::AppState;

pub const SESSION_COOKIE: &str = "roi_admin_session";

const MAX_SESSIONS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub created_at: DateTime<Utc>,
}

/// Live admin sessions keyed by opaque token. Entries expire after the TTL.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, AdminSession>,
    ttl: Duration,
    secure: bool,
}

impl SessionStore {
    pub fn new(ttl: Duration, secure: bool) -> Self {
        let sessions = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(MAX_SESSIONS)
            .build();
        Self {
            sessions,
            ttl,
            secure,
        }
    }

    /// Starts a session and returns its token.
    pub async fn create(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .insert(
                token.clone(),
                AdminSession {
                    created_at: Utc::now(),
                },
            )
            .await;
        tracing::info!("Admin session started");
        token
    }

    pub async fn get(&self, token: &str) -> Option<AdminSession> {
        self.sessions.get(token).await
    }

    pub async fn invalidate(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn cookie_for(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.ttl.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Session token from the request's `Cookie` headers, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Compares a submitted password against the configured one without leaking
/// the length or the position of the first mismatch.
pub fn password_matches(candidate: &str, expected: &str) -> bool {
    let candidate = hex::encode(Sha256::digest(candidate.as_bytes()));
    let expected = hex::encode(Sha256::digest(expected.as_bytes()));
    constant_time_compare(&candidate, &expected)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Whether the request carries a live admin session.
pub async fn is_authenticated(sessions: &SessionStore, headers: &HeaderMap) -> bool {
    match session_id_from_headers(headers) {
        Some(token) => sessions.get(&token).await.is_some(),
        None => false,
    }
}

/// Rejects requests without a live admin session.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_authenticated(&state.sessions, request.headers()).await {
        return Err(AppError::Unauthorized(
            "Admin authentication required".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_password_matches() {
        assert!(password_matches("hunter2", "hunter2"));
        assert!(!password_matches("hunter3", "hunter2"));
        assert!(!password_matches("", "hunter2"));
        assert!(!password_matches("hunter2 ", "hunter2"));
    }

    #[test]
    fn test_session_id_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; roi_admin_session=abc123; other=1"),
        );
        assert_eq!(session_id_from_headers(&headers), Some("abc123".to_string()));

        headers.insert(header::COOKIE, HeaderValue::from_static("roi_admin_session="));
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let store = SessionStore::new(Duration::from_secs(3600), false);
        let cookie = store.cookie_for("tok");
        assert_eq!(
            cookie,
            "roi_admin_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        assert!(store.clear_cookie().contains("Max-Age=0"));

        let secure = SessionStore::new(Duration::from_secs(60), true);
        assert!(secure.cookie_for("tok").ends_with("; Secure"));
        assert!(secure.clear_cookie().ends_with("; Secure"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(60), false);
        let token = store.create().await;
        assert_eq!(token.len(), 32);
        assert!(store.get(&token).await.is_some());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token)).unwrap(),
        );
        assert!(is_authenticated(&store, &headers).await);

        store.invalidate(&token).await;
        assert!(store.get(&token).await.is_none());
        assert!(!is_authenticated(&store, &headers).await);
    }
}
