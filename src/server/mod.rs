//! REST API server: state, routes, and request handlers.

pub mod auth;
pub mod github;
pub mod posts;
pub mod profiles;
pub mod users;

pub use auth::AuthUser;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

/// Application state shared across handlers.
///
/// Initialized once at startup and injected via axum `State`; handlers hold
/// no other shared mutable state.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub http: reqwest::Client,
    pub github_token: Option<String>,
}

impl AppState {
    pub fn new(pool: SqlitePool, github_token: Option<String>) -> Self {
        Self {
            pool,
            http: reqwest::Client::new(),
            github_token,
        }
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required).
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Builds the full API router.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/users", post(users::register))
        .route("/api/auth", post(users::login))
        .route("/api/profile", get(profiles::list_profiles))
        .route("/api/profile/user/{user_id}", get(profiles::get_profile_by_user))
        .route("/api/profile/github/{username}", get(github::get_repos));

    // Protected routes (Bearer token required)
    let protected_routes = Router::new()
        .route("/api/auth", get(users::current_user))
        .route("/api/posts", post(posts::create_post).get(posts::list_posts))
        .route("/api/posts/{id}", get(posts::get_post).delete(posts::delete_post))
        .route("/api/posts/like/{id}", put(posts::like_post))
        .route("/api/posts/unlike/{id}", put(posts::unlike_post))
        .route("/api/posts/comment/{id}", post(posts::add_comment))
        .route(
            "/api/posts/comment/{id}/{comment_id}",
            delete(posts::delete_comment),
        )
        .route("/api/profile/me", get(profiles::get_own_profile))
        .route(
            "/api/profile",
            post(profiles::upsert_profile).delete(profiles::delete_account),
        )
        .route("/api/profile/experience", put(profiles::add_experience))
        .route(
            "/api/profile/experience/{exp_id}",
            delete(profiles::delete_experience),
        )
        .route("/api/profile/education", put(profiles::add_education))
        .route(
            "/api/profile/education/{edu_id}",
            delete(profiles::delete_education),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
