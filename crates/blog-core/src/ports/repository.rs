use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostChanges};
use crate::error::RepoError;

/// Generic repository trait defining the read and delete half of CRUD.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// List every entity. Ordering is store-defined.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    /// Number of stored entities.
    async fn count(&self) -> Result<u64, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` if absent.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post store.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Persist a validated draft. The store assigns `id` and `created`.
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError>;

    /// Apply a partial update. Fails with `RepoError::NotFound` if absent.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;

    /// Remove every post, returning how many were deleted.
    async fn delete_all(&self) -> Result<u64, RepoError>;
}
