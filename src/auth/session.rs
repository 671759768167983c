use super::provider::UserProfile;
use crate::error::{GuideError, Result};
use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "hill_guide.session-token";
pub const SESSION_DAYS: i64 = 30;
pub const STATE_MINUTES: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

/// In-memory sessions and pending sign-in states.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    pending: Mutex<HashMap<String, DateTime<Utc>>>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|e| GuideError::Storage {
        message: format!("session lock poisoned: {e}"),
    })
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a one-time `state` value for the authorize redirect.
    pub fn begin_sign_in(&self) -> Result<String> {
        let state = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let mut pending = lock(&self.pending)?;
        pending.retain(|_, issued| now - *issued < Duration::minutes(STATE_MINUTES));
        pending.insert(state.clone(), now);
        Ok(state)
    }

    /// Consume a `state` value. False when unknown, already used or expired.
    pub fn consume_state(&self, state: &str) -> Result<bool> {
        let issued = lock(&self.pending)?.remove(state);
        Ok(issued.is_some_and(|at| Utc::now() - at < Duration::minutes(STATE_MINUTES)))
    }

    /// Start a session for `profile`. Expired sessions are dropped first.
    pub fn create(&self, profile: &UserProfile) -> Result<(String, Session)> {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let session = Session {
            user: SessionUser {
                name: profile.name.clone(),
                email: profile.email.clone(),
                image: profile.image.clone(),
            },
            expires: now + Duration::days(SESSION_DAYS),
        };
        let mut sessions = lock(&self.sessions)?;
        sessions.retain(|_, s| s.expires > now);
        sessions.insert(token.clone(), session.clone());
        Ok((token, session))
    }

    pub fn get(&self, token: &str) -> Result<Option<Session>> {
        let mut sessions = lock(&self.sessions)?;
        match sessions.get(token) {
            Some(s) if s.expires > Utc::now() => Ok(Some(s.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn remove(&self, token: &str) -> Result<bool> {
        Ok(lock(&self.sessions)?.remove(token).is_some())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.sessions)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_DAYS * 24 * 60 * 60
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Session token from the request's `Cookie` headers, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn profile() -> UserProfile {
        UserProfile {
            provider: "google".to_string(),
            provider_account_id: "42".to_string(),
            email: Some("asha@example.com".to_string()),
            name: Some("Asha".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_state_is_single_use() {
        let store = SessionStore::new();
        let state = store.begin_sign_in().unwrap();
        assert!(store.consume_state(&state).unwrap());
        assert!(!store.consume_state(&state).unwrap());
        assert!(!store.consume_state("forged").unwrap());
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new();
        let (token, session) = store.create(&profile()).unwrap();
        assert_eq!(session.user.email.as_deref(), Some("asha@example.com"));
        assert_eq!(store.get(&token).unwrap(), Some(session));

        assert!(store.remove(&token).unwrap());
        assert_eq!(store.get(&token).unwrap(), None);
    }

    #[test]
    fn test_create_drops_expired_sessions() {
        let store = SessionStore::new();
        let (live, _) = store.create(&profile()).unwrap();
        let (_, mut stale) = store.create(&profile()).unwrap();
        stale.expires = Utc::now() - Duration::seconds(1);
        for i in 0..5 {
            store.sessions.lock().unwrap().insert(format!("stale-{i}"), stale.clone());
        }
        assert_eq!(store.len().unwrap(), 7);

        let (fresh, _) = store.create(&profile()).unwrap();
        assert_eq!(store.len().unwrap(), 3);
        assert!(store.get(&live).unwrap().is_some());
        assert!(store.get(&fresh).unwrap().is_some());
        assert!(store.get("stale-0").unwrap().is_none());
    }

    #[test]
    fn test_token_is_read_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; hill_guide.session-token=abc123; lang=en"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }
}
