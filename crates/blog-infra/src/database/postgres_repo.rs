//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use blog_core::domain::{NewPost, Post, PostChanges};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let post = Post::new(draft);
        tracing::debug!(post_id = %post.id, "Inserting post");

        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        if changes.is_empty() {
            return BaseRepository::<Post, Uuid>::find_by_id(self, id)
                .await?
                .ok_or(RepoError::NotFound);
        }

        // Only supplied columns are set, so the row is patched in one statement.
        let mut active = post::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(title) = changes.title() {
            active.title = Set(title.to_owned());
        }
        if let Some(content) = changes.content() {
            active.content = Set(content.to_owned());
        }
        if let Some(author) = changes.author() {
            active.author_first_name = Set(author.first_name.clone());
            active.author_last_name = Set(author.last_name.clone());
        }

        tracing::debug!(post_id = %id, "Updating post");
        let model = active.update(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(deleted = result.rows_affected, "Deleted all posts");
        Ok(result.rows_affected)
    }
}
