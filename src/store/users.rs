//! Registered users.
//!
//! Passwords are kept in plaintext; they are only ever compared in constant
//! time. Operations that also touch sessions take the user table lock first
//! and keep it while the session table is updated.

use std::collections::HashMap;

use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::ApiError;

use super::SessionStore;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique account name
    pub username: String,

    /// Plaintext password
    pub password: String,

    /// Whether the account may use admin-only endpoints
    pub is_admin: bool,
}

/// Outcome of [`UserStore::create_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCreation {
    /// A new account was inserted
    Created,
    /// An account with this name already existed; nothing changed
    AlreadyExists,
}

/// In-memory user table: username → [`User`].
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, User>>,
}

impl UserStore {
    /// Create an empty user store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one admin account.
    pub fn with_admin(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        let admin = User {
            username: username.clone(),
            password: password.into(),
            is_admin: true,
        };
        Self {
            users: RwLock::new(HashMap::from([(username, admin)])),
        }
    }

    /// Register a regular (non-admin) account.
    ///
    /// Registering an existing name is not an error: the store is left
    /// untouched and [`UserCreation::AlreadyExists`] is returned.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserCreation, ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::MissingParams("Username or password missing"));
        }

        let mut users = self.users.write().await;
        if users.contains_key(username) {
            debug!(username = username, "user already exists");
            return Ok(UserCreation::AlreadyExists);
        }

        users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password: password.to_string(),
                is_admin: false,
            },
        );
        info!(username = username, "user created");
        Ok(UserCreation::Created)
    }

    /// Look up a user by name.
    pub async fn get(&self, username: &str) -> Option<User> {
        self.users.read().await.get(username).cloned()
    }

    /// Check whether a user exists.
    pub async fn contains(&self, username: &str) -> bool {
        self.users.read().await.contains_key(username)
    }

    /// Check credentials and open a session for the user.
    ///
    /// Returns the new session token.
    pub async fn authenticate(
        &self,
        sessions: &SessionStore,
        username: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::MissingParams("Username or password missing"));
        }

        // Held until the session is recorded so a concurrent delete cannot
        // slip in between the check and the insert.
        let users = self.users.read().await;
        let valid = users
            .get(username)
            .map(|user| bool::from(user.password.as_bytes().ct_eq(password.as_bytes())))
            .unwrap_or(false);

        if !valid {
            debug!(username = username, "rejected credentials");
            return Err(ApiError::InvalidParams("Invalid username or password"));
        }

        let token = sessions.create(username).await;
        drop(users);

        info!(username = username, "user authenticated");
        Ok(token)
    }

    /// Delete a user and every session issued to them.
    ///
    /// Returns the number of sessions that were invalidated.
    pub async fn delete_user(
        &self,
        sessions: &SessionStore,
        username: &str,
    ) -> Result<usize, ApiError> {
        if username.is_empty() {
            return Err(ApiError::MissingParams("Username missing"));
        }

        let mut users = self.users.write().await;
        if users.remove(username).is_none() {
            return Err(ApiError::InvalidParams("Invalid username"));
        }

        let removed = sessions.remove_user(username).await;
        drop(users);

        info!(
            username = username,
            sessions_removed = removed,
            "user deleted"
        );
        Ok(removed)
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether no users are registered.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}
