use eventplan_common::{Language, PlanRequest};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::error::PlannerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| PlannerError::InvalidSessionId { id: s.to_string() })
    }
}

/// Per-user state: the step-wise pane anchored on a plan, and the free manual pane.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub step: Conversation,
    /// The request the current plan was generated from.
    pub plan_request: Option<PlanRequest>,
    pub manual: Conversation,
    pub manual_language: Language,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            step: Conversation::new(),
            plan_request: None,
            manual: Conversation::new(),
            manual_language: Language::default(),
        }
    }

    pub fn plan(&self) -> Option<&str> {
        self.step.context()
    }

    /// Language for step-wise follow-ups: the one the plan was requested in.
    pub fn step_language(&self) -> Language {
        self.plan_request.as_ref().map(|r| r.language).unwrap_or_default()
    }

    pub fn reset_step(&mut self) {
        self.step.reset();
        self.plan_request = None;
    }

    pub fn reset_manual(&mut self) {
        self.manual.reset();
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// How long a session may sit untouched before the registry drops it.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

impl Entry {
    fn new(handle: SessionHandle) -> Self {
        Self { handle, last_seen: Instant::now() }
    }

    /// Idle past the TTL and not held by any in-flight request.
    fn expired(&self, ttl: Duration) -> bool {
        Arc::strong_count(&self.handle) == 1 && self.last_seen.elapsed() >= ttl
    }
}

/// In-memory registry of live sessions.
///
/// Each session sits behind its own mutex, so actions within one session run
/// one at a time while other sessions proceed independently. Idle sessions
/// are swept whenever a session is created, so abandoned tabs do not pile up.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Entry>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), idle_ttl }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn create(&self) -> (SessionId, SessionHandle) {
        let id = SessionId::new();
        let handle = Arc::new(Mutex::new(Session::new(id)));
        let mut guard = self.sessions.write().await;
        self.evict_idle(&mut guard);
        guard.insert(id, Entry::new(handle.clone()));
        tracing::info!(session = %id, "session created");
        (id, handle)
    }

    /// Look up a live session and mark it as seen. Expired sessions count as gone.
    pub async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let mut guard = self.sessions.write().await;
        if guard.get(id)?.expired(self.idle_ttl) {
            guard.remove(id);
            tracing::info!(session = %id, "idle session evicted");
            return None;
        }
        let entry = guard.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    pub async fn get_or_create(&self, id: SessionId) -> SessionHandle {
        let mut guard = self.sessions.write().await;
        self.evict_idle(&mut guard);
        let entry = guard.entry(id).or_insert_with(|| {
            tracing::info!(session = %id, "session created");
            Entry::new(Arc::new(Mutex::new(Session::new(id))))
        });
        entry.last_seen = Instant::now();
        entry.handle.clone()
    }

    /// Drop a session and everything it holds. Returns false if it did not exist.
    pub async fn discard(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session discarded");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<SessionId, Entry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.expired(self.idle_ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
    }
}
