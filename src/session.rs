//! In-memory registry of games, one per browser tab.

use crate::coordinator::{Coordinator, SharedGame};
use noughts_tictactoe::Mark;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as GameMutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Unique identifier for a game session.
pub type SessionId = String;

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug)]
struct Entry {
    game: SharedGame,
    last_access: Instant,
}

/// Manages all game sessions.
///
/// A game untouched for longer than the idle TTL is dropped on the next
/// access to the registry. When the registry is full, creating a game drops
/// the least recently used one.
#[derive(Debug, Clone)]
pub struct SessionManager {
    human_mark: Mark,
    idle_ttl: Duration,
    max_sessions: usize,
    sessions: Arc<Mutex<HashMap<SessionId, Entry>>>,
}

impl SessionManager {
    /// Creates a new session manager; new games give the human `human_mark`.
    #[instrument]
    pub fn new(human_mark: Mark) -> Self {
        info!("Creating session manager");
        Self {
            human_mark,
            idle_ttl: DEFAULT_IDLE_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sets the idle TTL and the session cap. A cap of zero is treated as one.
    pub fn with_limits(mut self, idle_ttl: Duration, max_sessions: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// How long a game may sit untouched.
    pub fn idle_ttl(&self) -> &Duration {
        &self.idle_ttl
    }

    /// Most games kept at once.
    pub fn max_sessions(&self) -> &usize {
        &self.max_sessions
    }

    /// Returns the game for `id`, creating it on first access.
    #[instrument(skip(self))]
    pub fn get_or_create(&self, id: &str) -> SharedGame {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut sessions, now);

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_access = now;
            return entry.game.clone();
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            info!(session_id = %oldest, "Session cap reached, dropped least recently used");
        }

        let game = Arc::new(GameMutex::new(Coordinator::new(self.human_mark)));
        sessions.insert(
            id.to_string(),
            Entry {
                game: game.clone(),
                last_access: now,
            },
        );
        info!(session_id = id, "Created new session");
        game
    }

    /// Gets a session by ID.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<SharedGame> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut sessions, now);

        match sessions.get_mut(id) {
            Some(entry) => {
                entry.last_access = now;
                Some(entry.game.clone())
            }
            None => {
                debug!(session_id = id, "Session not found");
                None
            }
        }
    }

    /// Lists all active session IDs, sorted.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut sessions, Instant::now());
        let mut ids: Vec<SessionId> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut sessions, Instant::now());
        sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_idle(&self, sessions: &mut HashMap<SessionId, Entry>, now: Instant) {
        sessions.retain(|id, entry| {
            let keep = now.duration_since(entry.last_access) <= self.idle_ttl;
            if !keep {
                info!(session_id = %id, "Dropped idle session");
            }
            keep
        });
    }
}
