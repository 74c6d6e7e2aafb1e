//! Domain library for the user store.
//!
//! Holds the `User` record, the `UserRepository` port and the error type
//! shared by every adapter. Keep storage encodings and IO concerns out of
//! this crate; they belong in the adapter crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A user as the application sees it.
///
/// `id` is the store-independent identifier. Adapters are free to encode it
/// into whatever key layout they need, but must hand back the same `id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub age: u32,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        age: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            username: username.into(),
            age,
        }
    }
}

/// Repository port for persisting and loading users.
///
/// Lookups report absence as `Ok(None)`; an `Err` always means the backing
/// store failed or returned data that could not be read back as a `User`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users currently stored. An empty store yields an empty vec.
    async fn get_all(&self) -> Result<Vec<User>, CoreError>;
    /// Write the user unconditionally (overwrite) and hand it back.
    async fn save(&self, user: User) -> Result<User, CoreError>;
    /// First user whose username matches. Uniqueness is not enforced, so
    /// with duplicates there is no defined winner.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, CoreError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, CoreError>;
    /// Overwrite name, username and age of the user keyed by `user.id`.
    async fn update(&self, user: User) -> Result<User, CoreError>;
    /// Remove the user keyed by `user.id`. Deleting a missing user is not an error.
    async fn delete(&self, user: &User) -> Result<(), CoreError>;
}

/// Core domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found")]
    NotFound,
    #[error("decode error: {0}")]
    Decode(String),
    #[error("repository error: {0}")]
    Repository(String),
}

pub mod adapters;
