//! Active login sessions.
//!
//! Maps opaque session tokens to the username they were issued for. Tokens
//! are random v4 UUIDs rendered as 32 hex characters, so they cannot be
//! guessed from previously issued ones.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory session table: token → username.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `username` and record it.
    ///
    /// Callers must make sure the user exists; [`UserStore::authenticate`]
    /// does this while holding the user table lock.
    ///
    /// [`UserStore::authenticate`]: super::UserStore::authenticate
    pub async fn create(&self, username: &str) -> String {
        let mut sessions = self.sessions.write().await;
        loop {
            let token = mint_token();
            if let Entry::Vacant(slot) = sessions.entry(token.clone()) {
                slot.insert(username.to_string());
                debug!(username = username, "session created");
                return token;
            }
        }
    }

    /// Resolve a token to the username it was issued for.
    pub async fn username_for(&self, token: &str) -> Option<String> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Check whether `token` names a recorded session.
    pub async fn contains(&self, token: &str) -> bool {
        self.sessions.read().await.contains_key(token)
    }

    /// Remove every session belonging to `username`.
    ///
    /// Returns the number of sessions removed.
    pub async fn remove_user(&self, username: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, owner| owner != username);
        before - sessions.len()
    }

    /// Number of recorded sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are recorded.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn mint_token() -> String {
    Uuid::new_v4().simple().to_string()
}
