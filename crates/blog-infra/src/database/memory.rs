//! In-memory post store - used when no database is configured, and in tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{NewPost, Post, PostChanges};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository};

/// In-memory post repository backed by a `Vec` behind an async RwLock.
///
/// Posts are listed in insertion order.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.store.read().await.clone())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let index = store
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        store.remove(index);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let post = Post::new(draft);
        let mut store = self.store.write().await;

        if store.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        tracing::debug!(post_id = %post.id, "Inserting post");
        store.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        changes.apply(post);
        Ok(post.clone())
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let deleted = store.len() as u64;
        store.clear();
        Ok(deleted)
    }
}
