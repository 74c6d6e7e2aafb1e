use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{CoreError, User, UserRepository};

/// Simple in-memory user repository for tests and demos.
///
/// Mirrors the store semantics the DynamoDB adapter relies on: save and
/// update overwrite, delete of a missing id is a no-op, and username lookups
/// return the first match in id order.
pub struct InMemoryUserRepo {
    inner: Mutex<BTreeMap<String, User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, User>>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }
}

impl Default for InMemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn get_all(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    async fn save(&self, user: User) -> Result<User, CoreError> {
        self.lock()?.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        Ok(self
            .lock()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, CoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn update(&self, user: User) -> Result<User, CoreError> {
        self.lock()?.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete(&self, user: &User) -> Result<(), CoreError> {
        self.lock()?.remove(&user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User::new("42", "Ada", "ada", 30)
    }

    #[tokio::test]
    async fn save_then_get_by_id() {
        let repo = InMemoryUserRepo::new();
        let saved = repo.save(ada()).await.unwrap();
        assert_eq!(saved, ada());
        assert_eq!(repo.get_by_id("42").await.unwrap(), Some(ada()));
    }

    #[tokio::test]
    async fn lookups_on_empty_repo_are_none() {
        let repo = InMemoryUserRepo::new();
        assert!(repo.get_all().await.unwrap().is_empty());
        assert_eq!(repo.get_by_id("42").await.unwrap(), None);
        assert_eq!(repo.get_by_username("ada").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let repo = InMemoryUserRepo::new();
        repo.save(ada()).await.unwrap();
        let changed = User::new("42", "Augusta", "augusta", 36);
        repo.update(changed.clone()).await.unwrap();
        assert_eq!(repo.get_by_id("42").await.unwrap(), Some(changed.clone()));
        assert_eq!(repo.get_by_username("augusta").await.unwrap(), Some(changed));
        assert_eq!(repo.get_by_username("ada").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryUserRepo::new();
        repo.save(ada()).await.unwrap();
        repo.delete(&ada()).await.unwrap();
        repo.delete(&ada()).await.unwrap();
        assert_eq!(repo.get_by_id("42").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_usernames_return_first_in_id_order() {
        let repo = InMemoryUserRepo::new();
        repo.save(User::new("b", "Second", "dup", 2)).await.unwrap();
        repo.save(User::new("a", "First", "dup", 1)).await.unwrap();
        let got = repo.get_by_username("dup").await.unwrap().unwrap();
        assert_eq!(got.id, "a");
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }
}
