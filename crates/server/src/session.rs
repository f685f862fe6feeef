//! Server-side login sessions, carried by an `HttpOnly` cookie.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};
use chrono::{TimeDelta, Utc};
use std::fmt;

use helmios_api::crypto;

use crate::error::AuthError;
use crate::storage::{Db, sqlite_datetime};

pub const SESSION_COOKIE_NAME: &str = "helmios_session";

/// Longest accepted session lifetime (100 years). Expiry timestamps are
/// stored as `YYYY-MM-DD` text and compared lexically, which breaks once
/// the year needs a fifth digit.
pub const MAX_SESSION_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Opaque session token as handed to the client. Only its hash is stored.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Clone)]
pub struct SessionManager {
    db: Db,
    ttl: TimeDelta,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(db: Db, ttl_secs: u64, cookie_secure: bool) -> Self {
        if ttl_secs > MAX_SESSION_TTL_SECS {
            tracing::warn!(
                "session TTL of {ttl_secs}s is too large, capping at {MAX_SESSION_TTL_SECS}s"
            );
        }
        let ttl = TimeDelta::seconds(ttl_secs.min(MAX_SESSION_TTL_SECS) as i64);
        Self {
            db,
            ttl,
            cookie_secure,
        }
    }

    /// Issue a new session for `user_id`. Expired sessions are purged first.
    pub fn create_session(&self, user_id: &str) -> Result<SessionToken, AuthError> {
        let now = Utc::now();
        let purged = self.db.purge_expired_sessions(&sqlite_datetime(now))?;
        if purged > 0 {
            tracing::debug!("purged {purged} expired sessions");
        }

        let token = crypto::generate_token()?;
        let expires_at = now + self.ttl;
        self.db
            .insert_session(&crypto::hash_token(&token), user_id, &sqlite_datetime(expires_at))?;
        Ok(SessionToken(token))
    }

    /// The user behind `token`, if the session exists and has not expired.
    pub fn current_user(&self, token: &str) -> Result<Option<String>, AuthError> {
        let now = sqlite_datetime(Utc::now());
        Ok(self
            .db
            .active_session_user(&crypto::hash_token(token), &now)?)
    }

    /// Forget a session. Unknown tokens are ignored.
    pub fn destroy_session(&self, token: &str) -> Result<(), AuthError> {
        self.db.delete_session(&crypto::hash_token(token))?;
        Ok(())
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn session_cookie(&self, token: &SessionToken) -> Result<HeaderValue, InvalidHeaderValue> {
        let max_age = self.ttl.num_seconds();
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            token.as_str()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Read the session token from the request's `Cookie` headers.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// Auth gate
// ---------------------------------------------------------------------------

/// Authenticated user, resolved from the session cookie.
///
/// Requests without a live session are redirected to `/login`.
pub struct CurrentUser {
    pub user_id: String,
    pub token: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionManager::from_ref(state);

        let Some(token) = extract_session_token(&parts.headers) else {
            return Err(Redirect::to("/login").into_response());
        };

        match sessions.current_user(&token) {
            Ok(Some(user_id)) => Ok(CurrentUser { user_id, token }),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => {
                tracing::error!("session lookup failed: {e}");
                Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_db;

    fn setup(ttl_secs: u64) -> (tempfile::TempDir, SessionManager, String) {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        let user_id = db.create_user("alice", "hash", "CODE1").unwrap();
        (dir, SessionManager::new(db, ttl_secs, false), user_id)
    }

    #[test]
    fn anonymous_authenticated_anonymous() {
        let (_dir, sessions, user_id) = setup(3600);

        let token = sessions.create_session(&user_id).unwrap();
        assert_eq!(
            sessions.current_user(token.as_str()).unwrap(),
            Some(user_id)
        );

        sessions.destroy_session(token.as_str()).unwrap();
        assert_eq!(sessions.current_user(token.as_str()).unwrap(), None);
        sessions.destroy_session(token.as_str()).unwrap();
    }

    #[test]
    fn tokens_are_unique_per_login() {
        let (_dir, sessions, user_id) = setup(3600);
        let a = sessions.create_session(&user_id).unwrap();
        let b = sessions.create_session(&user_id).unwrap();
        assert_ne!(a, b);
        assert!(sessions.current_user(a.as_str()).unwrap().is_some());
        assert!(sessions.current_user(b.as_str()).unwrap().is_some());
    }

    #[test]
    fn zero_ttl_session_is_never_active() {
        let (_dir, sessions, user_id) = setup(0);
        let token = sessions.create_session(&user_id).unwrap();
        assert_eq!(sessions.current_user(token.as_str()).unwrap(), None);
    }

    #[test]
    fn oversized_ttl_is_capped_and_still_active() {
        for ttl in [300_000_000_000, u64::MAX] {
            let (_dir, sessions, user_id) = setup(ttl);
            let token = sessions.create_session(&user_id).unwrap();
            assert_eq!(
                sessions.current_user(token.as_str()).unwrap(),
                Some(user_id.clone())
            );

            // A later login purges expired rows; this one must survive it.
            sessions.create_session(&user_id).unwrap();
            assert!(sessions.current_user(token.as_str()).unwrap().is_some());

            let cookie = sessions.session_cookie(&token).unwrap();
            assert!(
                cookie
                    .to_str()
                    .unwrap()
                    .contains(&format!("Max-Age={MAX_SESSION_TTL_SECS}"))
            );
        }
    }

    #[test]
    fn unknown_token_has_no_user() {
        let (_dir, sessions, _) = setup(3600);
        assert_eq!(sessions.current_user("not-a-token").unwrap(), None);
    }

    #[test]
    fn cookie_attributes() {
        let (_dir, sessions, user_id) = setup(60);
        let token = sessions.create_session(&user_id).unwrap();
        let cookie = sessions.session_cookie(&token).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}={}", token.as_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(!cookie.contains("Secure"));

        let cleared = sessions.clear_cookie().unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn secure_flag_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        let sessions = SessionManager::new(db, 60, true);
        assert!(sessions.clear_cookie().unwrap().to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; helmios_session=abc123 ; other=1"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("helmios_session="));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = SessionToken("secret".into());
        assert!(!format!("{token:?}").contains("secret"));
    }
}
