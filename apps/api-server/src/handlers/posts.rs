//! Blog post resource handlers.

use actix_web::{HttpResponse, web};
use chrono::SecondsFormat;
use uuid::Uuid;

use blog_core::domain::{Author, NewPost, Post, PostChanges};
use blog_core::{DomainError, RepoError};
use blog_shared::dto::{AuthorInput, CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Project a stored post onto its wire shape, joining the author name.
fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        title: post.title,
        content: post.content,
        author: post.author.display_name(),
        created: post.created.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn parse_author(input: AuthorInput) -> Result<Author, DomainError> {
    let first_name = input
        .first_name
        .ok_or_else(|| DomainError::missing_field("author.firstName"))?;
    let last_name = input
        .last_name
        .ok_or_else(|| DomainError::missing_field("author.lastName"))?;
    Author::new(first_name, last_name)
}

/// Ids are opaque to clients; one that is not a UUID cannot name a post.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Post with id {raw} not found")))
}

fn not_found_as_post(id: Uuid) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound => DomainError::post_not_found(id).into(),
        other => other.into(),
    }
}

/// GET /posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    tracing::debug!(count = posts.len(), "Listing posts");

    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::post_not_found(id))?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let title = req.title.ok_or_else(|| DomainError::missing_field("title"))?;
    let content = req
        .content
        .ok_or_else(|| DomainError::missing_field("content"))?;
    let author = req
        .author
        .ok_or_else(|| DomainError::missing_field("author"))?;
    let draft = NewPost::new(title, content, parse_author(author)?)?;

    let post = state.posts.create(draft).await?;
    tracing::info!(post_id = %post.id, "Created post");

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// PUT /posts/{id}
///
/// Responds 201 on success, which existing clients of this API check for.
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if let Some(body_id) = req.id.as_deref() {
        if body_id != path.as_str() {
            return Err(AppError::BadRequest(format!(
                "Request path id ({}) and request body id ({}) must match",
                path.as_str(),
                body_id
            )));
        }
    }
    let id = parse_id(&path)?;

    let author = req.author.map(parse_author).transpose()?;
    let changes = PostChanges::new(req.title, req.content, author)?;

    let post = state
        .posts
        .update(id, changes)
        .await
        .map_err(not_found_as_post(id))?;
    tracing::info!(post_id = %post.id, "Updated post");

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// DELETE /posts/{id}
///
/// Always 204: deleting a post that does not exist leaves the store in the
/// state the caller asked for.
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let Ok(id) = Uuid::parse_str(&path) else {
        return Ok(HttpResponse::NoContent().finish());
    };

    match state.posts.delete(id).await {
        Ok(()) => tracing::info!(post_id = %id, "Deleted post"),
        Err(RepoError::NotFound) => tracing::debug!(post_id = %id, "Post already absent"),
        Err(e) => return Err(e.into()),
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    use blog_core::ports::BaseRepository;
    use blog_infra::InMemoryPostRepository;
    use blog_infra::fixtures::{DEFAULT_SEED_SIZE, seed_posts};
    use blog_shared::ErrorResponse;

    use super::*;
    use crate::handlers::configure_routes;

    macro_rules! init_app {
        ($repo:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::with_repository($repo.clone())))
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn seeded_repo() -> Arc<InMemoryPostRepository> {
        let repo = Arc::new(InMemoryPostRepository::new());
        seed_posts(repo.as_ref(), DEFAULT_SEED_SIZE).await.unwrap();
        repo
    }

    async fn first_post(repo: &InMemoryPostRepository) -> Post {
        repo.find_all().await.unwrap().remove(0)
    }

    #[actix_web::test]
    async fn test_list_returns_every_post() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Vec<PostResponse> = test::read_body_json(resp).await;
        assert!(!body.is_empty());
        assert_eq!(body.len() as u64, repo.count().await.unwrap());
    }

    #[actix_web::test]
    async fn test_list_fields_match_store() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;
        let body: Vec<serde_json::Value> = test::read_body_json(resp).await;
        for entry in &body {
            for key in ["id", "title", "content", "author", "created"] {
                assert!(entry.get(key).is_some(), "missing key {key}");
            }
        }

        let listed: PostResponse = serde_json::from_value(body[0].clone()).unwrap();
        let stored = repo
            .find_by_id(Uuid::parse_str(&listed.id).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listed.title, stored.title);
        assert_eq!(listed.content, stored.content);
        assert_eq!(listed.author, stored.author.display_name());
    }

    #[actix_web::test]
    async fn test_list_empty_store() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let app = init_app!(repo);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Vec<PostResponse> = test::read_body_json(resp).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn test_create_round_trip() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({
                "title": "T",
                "content": "C",
                "author": { "firstName": "F", "lastName": "L" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: PostResponse = test::read_body_json(resp).await;
        assert_eq!(body.title, "T");
        assert_eq!(body.content, "C");
        assert_eq!(body.author, "F L");
        assert!(!body.created.is_empty());

        let stored = repo
            .find_by_id(Uuid::parse_str(&body.id).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "T");
        assert_eq!(stored.content, "C");
        assert_eq!(stored.author.first_name, "F");
        assert_eq!(stored.author.last_name, "L");
        assert_eq!(repo.count().await.unwrap(), DEFAULT_SEED_SIZE as u64 + 1);
    }

    #[actix_web::test]
    async fn test_create_rejects_missing_fields() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let app = init_app!(repo);

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({
                "title": "T",
                "content": "C",
                "author": { "firstName": "F" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let problem: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(problem.status, 400);
        assert!(problem.detail.unwrap().contains("author.lastName"));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_create_rejects_malformed_json() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let app = init_app!(repo);

        let req = test::TestRequest::post()
            .uri("/posts")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"title\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_single_post() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);
        let post = first_post(&repo).await;

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", post.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: PostResponse = test::read_body_json(resp).await;
        assert_eq!(body.id, post.id.to_string());

        for missing in [Uuid::new_v4().to_string(), "not-an-id".to_string()] {
            let req = test::TestRequest::get()
                .uri(&format!("/posts/{missing}"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn test_update_replaces_sent_fields() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);
        let post = first_post(&repo).await;

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", post.id))
            .set_json(json!({
                "id": post.id.to_string(),
                "title": "cats cats cats",
                "content": "dogs dogs dogs",
                "author": { "firstName": "foo", "lastName": "bar" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: PostResponse = test::read_body_json(resp).await;
        assert_eq!(body.title, "cats cats cats");
        assert_eq!(body.content, "dogs dogs dogs");
        assert_eq!(body.author, "foo bar");

        let stored = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "cats cats cats");
        assert_eq!(stored.content, "dogs dogs dogs");
        assert_eq!(stored.author.first_name, "foo");
        assert_eq!(stored.author.last_name, "bar");
        assert_eq!(stored.created, post.created);
    }

    #[actix_web::test]
    async fn test_update_title_only() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);
        let post = first_post(&repo).await;

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", post.id))
            .set_json(json!({ "title": "only the title" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let stored = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "only the title");
        assert_eq!(stored.content, post.content);
        assert_eq!(stored.author, post.author);
    }

    #[actix_web::test]
    async fn test_update_rejects_mismatched_id() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);
        let post = first_post(&repo).await;

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", post.id))
            .set_json(json!({ "id": Uuid::new_v4().to_string(), "title": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let stored = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, post.title);
    }

    #[actix_web::test]
    async fn test_update_unknown_post() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let app = init_app!(repo);

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", Uuid::new_v4()))
            .set_json(json!({ "title": "ghost" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_removes_post() {
        let repo = seeded_repo().await;
        let app = init_app!(repo);
        let post = first_post(&repo).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(repo.find_by_id(post.id).await.unwrap().is_none());

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(repo.count().await.unwrap(), DEFAULT_SEED_SIZE as u64 - 1);
    }

    #[actix_web::test]
    async fn test_created_ids_are_unique() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let app = init_app!(repo);

        let mut ids = std::collections::HashSet::new();
        for i in 0..20 {
            let req = test::TestRequest::post()
                .uri("/posts")
                .set_json(json!({
                    "title": format!("post {i}"),
                    "content": "body",
                    "author": { "firstName": "F", "lastName": "L" }
                }))
                .to_request();
            let body: PostResponse = test::call_and_read_body_json(&app, req).await;
            ids.insert(body.id);
        }

        assert_eq!(ids.len(), 20);
    }
}
