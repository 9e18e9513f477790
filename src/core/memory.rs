//! In-process conversation memory
//!
//! Each user gets a sliding window of their most recent turns. Appends for one user are
//! serialized through that user's own lock, so different users never wait on each other
//! beyond the brief map lookup. Nothing is persisted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::conversation::Turn;

/// Turns retained per user; a user/assistant exchange counts as two
pub const MAX_TURNS: usize = 10;

struct UserHistory {
    last_active: AtomicU64,
    turns: Mutex<VecDeque<Turn>>,
}

impl UserHistory {
    fn new(now: u64) -> Self {
        Self {
            last_active: AtomicU64::new(now),
            turns: Mutex::new(VecDeque::with_capacity(MAX_TURNS + 1)),
        }
    }
}

/// Per-user bounded conversation histories
pub struct ConversationStore {
    users: RwLock<HashMap<String, Arc<UserHistory>>>,
    max_turns: usize,
    max_users: Option<usize>,
    clock: AtomicU64,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            max_turns: MAX_TURNS,
            max_users: None,
            clock: AtomicU64::new(0),
        }
    }

    /// Cap the number of tracked users; the least recently active one is evicted first
    pub fn with_user_cap(mut self, max_users: Option<usize>) -> Self {
        self.max_users = max_users.filter(|&n| n > 0);
        self
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn history_for(&self, user_id: &str) -> Arc<UserHistory> {
        if let Some(history) = self.users.read().await.get(user_id) {
            return history.clone();
        }

        let mut users = self.users.write().await;
        if let Some(history) = users.get(user_id) {
            return history.clone();
        }

        if let Some(cap) = self.max_users {
            while users.len() >= cap {
                let Some(oldest) = users
                    .iter()
                    .min_by_key(|(_, h)| h.last_active.load(Ordering::Relaxed))
                    .map(|(id, _)| id.clone())
                else {
                    break;
                };
                users.remove(&oldest);
                tracing::debug!(user_id = %oldest, "evicted idle conversation");
            }
        }

        let history = Arc::new(UserHistory::new(self.tick()));
        users.insert(user_id.to_string(), history.clone());
        history
    }

    /// Append a turn, dropping the oldest turns beyond the window
    pub async fn append(&self, user_id: &str, turn: Turn) {
        let history = self.history_for(user_id).await;
        history.last_active.store(self.tick(), Ordering::Relaxed);

        let mut turns = history.turns.lock().await;
        turns.push_back(turn);
        while turns.len() > self.max_turns {
            turns.pop_front();
        }
    }

    /// Current history, oldest first; empty for an unseen user
    pub async fn read(&self, user_id: &str) -> Vec<Turn> {
        let history = match self.users.read().await.get(user_id) {
            Some(history) => history.clone(),
            None => return Vec::new(),
        };
        let turns = history.turns.lock().await;
        turns.iter().cloned().collect()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}
