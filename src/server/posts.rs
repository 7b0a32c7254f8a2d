//! Post handlers: CRUD, likes, and comments.
//!
//! Every mutation is a single read-modify-write of one post document. A
//! malformed post id is treated as a missing post (404), never as a
//! validation error.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use super::AppState;
use crate::db::{PostRepository, UserRepository};
use crate::error::ApiError;
use crate::models::{Comment, Like, Post, User};

fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("No post found"))
}

async fn load_post(repo: &PostRepository, id: Uuid) -> Result<Post, ApiError> {
    repo.get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("No post found"))
}

async fn load_author(state: &AppState, identity: AuthUser) -> Result<User, ApiError> {
    UserRepository::new(state.pool.clone())
        .get_by_id(identity.id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/posts: create a post, snapshotting the author's name/avatar.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Json(req): Json<PostRequest>,
) -> Result<Json<Post>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::validation("text", "Text is required"));
    }

    let author = load_author(&state, identity).await?;
    let post = Post::new(author.id, author.name, author.avatar, req.text);

    PostRepository::new(state.pool.clone()).create(&post).await?;

    Ok(Json(post))
}

/// GET /api/posts: all posts, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(_identity): Extension<AuthUser>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = PostRepository::new(state.pool.clone()).list().await?;
    Ok(Json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Extension(_identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_post_id(&id)?;
    let repo = PostRepository::new(state.pool.clone());
    let post = load_post(&repo, id).await?;
    Ok(Json(post))
}

#[derive(serde::Serialize)]
pub struct DeletedResponse {
    pub msg: &'static str,
}

/// DELETE /api/posts/{id}: author only.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_post_id(&id)?;
    let repo = PostRepository::new(state.pool.clone());
    let post = load_post(&repo, id).await?;

    if post.user != identity.id {
        return Err(ApiError::Unauthorized("Unauthorized access"));
    }

    repo.delete(id).await?;
    Ok(Json(DeletedResponse { msg: "Post removed" }))
}

/// PUT /api/posts/like/{id}: idempotent: a duplicate like returns the
/// current like list unchanged.
pub async fn like_post(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let id = parse_post_id(&id)?;
    let repo = PostRepository::new(state.pool.clone());
    let mut post = load_post(&repo, id).await?;

    if post.like(identity.id) {
        repo.save(&post).await?;
    }

    Ok(Json(post.likes))
}

/// PUT /api/posts/unlike/{id}: idempotent: unliking a post never liked
/// returns the unchanged list.
pub async fn unlike_post(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let id = parse_post_id(&id)?;
    let repo = PostRepository::new(state.pool.clone());
    let mut post = load_post(&repo, id).await?;

    if post.unlike(identity.id) {
        repo.save(&post).await?;
    }

    Ok(Json(post.likes))
}

/// POST /api/posts/comment/{id}: prepend a comment with an author snapshot.
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<PostRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::validation("text", "Text is required"));
    }

    let id = parse_post_id(&id)?;
    let author = load_author(&state, identity).await?;
    let repo = PostRepository::new(state.pool.clone());
    let mut post = load_post(&repo, id).await?;

    post.add_comment(author.id, author.name, author.avatar, req.text);
    repo.save(&post).await?;

    Ok(Json(post.comments))
}

/// DELETE /api/posts/comment/{id}/{comment_id}: comment author only;
/// removal is by comment id, preserving the order of the rest.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let id = parse_post_id(&id)?;
    let comment_id =
        Uuid::parse_str(&comment_id).map_err(|_| ApiError::NotFound("Comment does not exist"))?;

    let repo = PostRepository::new(state.pool.clone());
    let mut post = load_post(&repo, id).await?;

    let comment = post
        .comment(comment_id)
        .ok_or(ApiError::NotFound("Comment does not exist"))?;
    if comment.user != identity.id {
        return Err(ApiError::Unauthorized("User not authorized"));
    }

    post.remove_comment(comment_id);
    repo.save(&post).await?;

    Ok(Json(post.comments))
}
