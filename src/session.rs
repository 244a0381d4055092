use crate::{app::ShortenerApp, models::Notice, AppState};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use dashmap::DashMap;
use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

// ── Session Store ──────────────────────────────────────────────────────────

/// Everything a single browser session owns. Lives only in process memory.
#[derive(Debug)]
pub struct Session {
    pub app: ShortenerApp,
    /// Consumed by the next page render.
    pub notice: Option<Notice>,
    created_at: Instant,
    /// Creation order, used to pick the eviction victim.
    seq: u64,
}

impl Session {
    fn new(seq: u64) -> Self {
        Self {
            app: ShortenerApp::new(),
            notice: None,
            created_at: Instant::now(),
            seq,
        }
    }
}

/// In-memory session registry keyed by session token (UUID). A session is
/// valid for `session_duration` after creation, matching the cookie max-age,
/// and at most `max_sessions` are held at once.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    pub session_duration: Duration,
    max_sessions: usize,
    next_seq: AtomicU64,
}

impl SessionStore {
    pub fn new(session_duration_hours: u64, max_sessions: usize) -> Self {
        Self::with_limits(
            Duration::from_secs(session_duration_hours.saturating_mul(3600)),
            max_sessions,
        )
    }

    pub fn with_limits(session_duration: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            session_duration,
            max_sessions: max_sessions.max(1),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Create a new, empty session and return its token. When the store is
    /// full, expired sessions are dropped first, then the oldest live one.
    pub fn create(&self) -> String {
        if self.sessions.len() >= self.max_sessions {
            self.prune_expired();
        }
        if self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }

        let token = Uuid::new_v4().to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(token.clone(), Session::new(seq));
        tracing::debug!("Session created ({} live)", self.sessions.len());
        token
    }

    /// Drop every expired session and return how many were removed.
    pub fn prune_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| self.is_live(s));
        before.saturating_sub(self.sessions.len())
    }

    fn evict_oldest(&self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.seq)
            .map(|entry| entry.key().clone());

        if let Some(token) = oldest {
            self.sessions.remove(&token);
            tracing::debug!("Session store full, evicted oldest session");
        }
    }

    fn is_live(&self, session: &Session) -> bool {
        session.created_at.elapsed() < self.session_duration
    }

    /// Return `true` if the token exists and has not expired.
    pub fn is_valid(&self, token: &str) -> bool {
        self.sessions
            .get(token)
            .map(|s| self.is_live(&s))
            .unwrap_or(false)
    }

    /// Run `f` against the session's state. The shard lock is held for the
    /// duration of `f`, so it must not block.
    pub fn with_session<R>(&self, token: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut session = self.sessions.get_mut(token)?;
        if !self.is_live(&session) {
            return None;
        }
        Some(f(&mut *session))
    }

    /// Number of sessions currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ── Visitor extractor ──────────────────────────────────────────────────────

/// Extractor resolving the caller's session from the `session_id` cookie.
///
/// Reading never creates a session; handlers that change state call
/// [`Visitor::establish`], after which `jar` carries the cookie that has to be
/// sent back with the response.
pub struct Visitor {
    token: Option<String>,
    pub jar: CookieJar,
}

impl Visitor {
    /// Token of a live session, if the caller has one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Return the caller's session token, creating the session (and queuing
    /// its cookie) if there is none yet.
    pub fn establish(&mut self, sessions: &SessionStore) -> String {
        if let Some(token) = &self.token {
            return token.clone();
        }

        let token = sessions.create();
        let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(
                i64::try_from(sessions.session_duration.as_secs()).unwrap_or(i64::MAX),
            ))
            .build();

        self.jar = self.jar.clone().add(cookie);
        self.token = Some(token.clone());
        token
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|token| state.sessions.is_valid(token));

        Ok(Visitor { token, jar })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    #[test]
    fn new_session_is_empty_and_live() {
        let store = SessionStore::new(24, 10);
        let token = store.create();

        assert!(store.is_valid(&token));
        let (count, page) = store
            .with_session(&token, |s| (s.app.urls().len(), s.app.page()))
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(page, Page::Shorten);
    }

    #[test]
    fn unknown_token_is_rejected() {
        let store = SessionStore::new(24, 10);
        assert!(!store.is_valid("nope"));
        assert!(store.with_session("nope", |_| ()).is_none());
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new(24, 10);
        let a = store.create();
        let b = store.create();

        store
            .with_session(&a, |s| {
                s.app
                    .submit("https://example.com", "mine", chrono::Utc::now())
            })
            .unwrap()
            .unwrap();

        assert_eq!(store.with_session(&a, |s| s.app.urls().len()), Some(1));
        assert_eq!(store.with_session(&b, |s| s.app.urls().len()), Some(0));
    }

    #[test]
    fn expired_sessions_are_refused_and_pruned() {
        let store = SessionStore::with_limits(Duration::ZERO, 10);
        let token = store.create();

        assert!(!store.is_valid(&token));
        assert!(store.with_session(&token, |_| ()).is_none());
        assert_eq!(store.len(), 1);

        assert_eq!(store.prune_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn store_never_exceeds_its_capacity() {
        let store = SessionStore::new(24, 3);
        let tokens: Vec<String> = (0..10).map(|_| store.create()).collect();

        assert_eq!(store.len(), 3);
        assert!(!store.is_valid(&tokens[0]));
        assert!(tokens[7..].iter().all(|t| store.is_valid(t)));
    }

    #[test]
    fn huge_duration_does_not_overflow() {
        let store = SessionStore::new(u64::MAX, 1);
        let token = store.create();
        assert!(store.is_valid(&token));
    }

    #[test]
    fn establish_creates_once_and_sets_cookie() {
        let store = SessionStore::new(24, 10);
        let mut visitor = Visitor {
            token: None,
            jar: CookieJar::new(),
        };

        let first = visitor.establish(&store);
        let second = visitor.establish(&store);

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(visitor.jar.get(SESSION_COOKIE).unwrap().value(), first);
    }
}
