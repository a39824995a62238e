//! In-memory chat sessions for the web front ends (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex, MutexGuard, RwLock};
use uuid::Uuid;

use crate::agent::SessionPhase;
use crate::history::{SessionHistory, Turn};

pub const DEFAULT_MAX_SESSIONS: usize = 100;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

/// One browser tab's conversation.
///
/// `turn` serializes messages within the session. The history lock is only
/// held for snapshots and updates, so the phase and turn list stay readable
/// while a turn is running.
pub struct ChatSession {
    id: Uuid,
    turn: Mutex<()>,
    history: Mutex<SessionHistory>,
    phase: watch::Sender<SessionPhase>,
    last_active: Mutex<Instant>,
}

impl ChatSession {
    fn new(id: Uuid, history_limit: usize) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Idle);
        Self {
            id,
            turn: Mutex::new(()),
            history: Mutex::new(SessionHistory::new(history_limit)),
            phase,
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    pub fn set_phase(&self, phase: SessionPhase) {
        self.phase.send_replace(phase);
    }

    /// Wait for any running turn to finish and claim the session.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        let guard = self.turn.lock().await;
        self.touch().await;
        guard
    }

    fn is_busy(&self) -> bool {
        self.turn.try_lock().is_err()
    }

    /// Copy of the history to build a prompt from.
    pub async fn history_snapshot(&self) -> SessionHistory {
        self.history.lock().await.clone()
    }

    pub async fn record_turn(&self, user: &str, assistant: String) {
        self.history.lock().await.append_turn(user, assistant);
        self.touch().await;
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    pub async fn turns(&self) -> Vec<Turn> {
        self.history.lock().await.turns().cloned().collect()
    }

    async fn touch(&self) {
        *self.last_active.lock().await = Instant::now();
    }

    async fn idle_since(&self) -> Instant {
        *self.last_active.lock().await
    }
}

/// Sessions keyed by id.
///
/// Creating a session first drops sessions idle for longer than `idle_ttl`,
/// then the least recently active idle session while the store is full.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<ChatSession>>>>,
    history_limit: usize,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(history_limit: usize) -> Self {
        Self::with_limits(history_limit, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }

    pub fn with_limits(history_limit: usize, max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            history_limit,
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Arc<ChatSession> {
        let session = Arc::new(ChatSession::new(Uuid::new_v4(), self.history_limit));
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, Instant::now()).await;
        sessions.insert(session.id, session.clone());
        tracing::debug!(session = %session.id, total = sessions.len(), "Created chat session");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ChatSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle at `now`, then make room for one more.
    async fn evict(&self, sessions: &mut HashMap<Uuid, Arc<ChatSession>>, now: Instant) {
        let mut idle = Vec::with_capacity(sessions.len());
        for (id, session) in sessions.iter() {
            if !session.is_busy() {
                idle.push((*id, session.idle_since().await));
            }
        }

        let mut expired = 0;
        idle.retain(|(id, since)| {
            if now.saturating_duration_since(*since) > self.idle_ttl {
                sessions.remove(id);
                expired += 1;
                false
            } else {
                true
            }
        });

        idle.sort_by_key(|(_, since)| *since);
        let mut oldest = idle.into_iter();
        while sessions.len() >= self.max_sessions {
            match oldest.next() {
                Some((id, _)) => {
                    sessions.remove(&id);
                    expired += 1;
                }
                None => break,
            }
        }

        if expired > 0 {
            tracing::debug!(evicted = expired, "Evicted chat sessions");
        }
    }
}
