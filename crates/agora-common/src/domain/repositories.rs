//! Repositories - Persistence abstraction for aggregates
//!
//! Repository pattern:
//! - Abstracts persistence details
//! - Works with whole records (save is a full replace)
//! - No optimistic concurrency: the last write wins

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// A record that can be stored by ID
pub trait Entity: Clone + Send + Sync + 'static {
    /// Record ID
    fn id(&self) -> Uuid;

    /// Listing order key
    fn created_at(&self) -> DateTime<Utc>;
}

/// Repository trait
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Get record by ID
    async fn get(&self, id: Uuid) -> RepoResult<T>;

    /// Insert a new record; fails if the ID is taken
    async fn insert(&self, item: &T) -> RepoResult<()>;

    /// Save (insert or replace) a record
    async fn save(&self, item: &T) -> RepoResult<()>;

    /// Delete record
    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    /// All records, oldest first
    async fn list(&self) -> RepoResult<Vec<T>>;
}

/// In-memory repository (for testing and development)
pub struct InMemoryRepository<T: Entity> {
    items: RwLock<HashMap<Uuid, T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: Uuid) -> RepoResult<T> {
        self.items
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn insert(&self, item: &T) -> RepoResult<()> {
        let mut items = self.items.write();
        if items.contains_key(&item.id()) {
            return Err(RepositoryError::Conflict(item.id().to_string()));
        }
        items.insert(item.id(), item.clone());
        Ok(())
    }

    async fn save(&self, item: &T) -> RepoResult<()> {
        self.items.write().insert(item.id(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.items
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list(&self) -> RepoResult<Vec<T>> {
        let mut items: Vec<T> = self.items.read().values().cloned().collect();
        items.sort_by_key(|item| (item.created_at(), item.id()));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        body: String,
        created_at: DateTime<Utc>,
    }

    impl Entity for Note {
        fn id(&self) -> Uuid {
            self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn note(body: &str, age_minutes: i64) -> Note {
        Note {
            id: Uuid::new_v4(),
            body: body.into(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = InMemoryRepository::new();
        let n = note("hello", 0);
        repo.save(&n).await.unwrap();
        assert_eq!(repo.get(n.id).await.unwrap(), n);
    }

    #[tokio::test]
    async fn test_insert_conflict() {
        let repo = InMemoryRepository::new();
        let n = note("hello", 0);
        repo.insert(&n).await.unwrap();
        assert!(matches!(repo.insert(&n).await, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let repo = InMemoryRepository::new();
        let mut n = note("first", 0);
        repo.save(&n).await.unwrap();
        let mut other = n.clone();
        n.body = "editor a".into();
        other.body = "editor b".into();
        repo.save(&n).await.unwrap();
        repo.save(&other).await.unwrap();
        assert_eq!(repo.get(n.id).await.unwrap().body, "editor b");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let repo = InMemoryRepository::new();
        let newer = note("newer", 1);
        let older = note("older", 10);
        repo.save(&newer).await.unwrap();
        repo.save(&older).await.unwrap();
        let bodies: Vec<_> = repo.list().await.unwrap().into_iter().map(|n| n.body).collect();
        assert_eq!(bodies, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let repo: InMemoryRepository<Note> = InMemoryRepository::new();
        assert!(matches!(repo.delete(Uuid::new_v4()).await, Err(RepositoryError::NotFound(_))));
    }
}
