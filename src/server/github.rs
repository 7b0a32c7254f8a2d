//! Proxy for the external repository-hosting API.

use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::error::ApiError;

const GITHUB_API: &str = "https://api.github.com";

/// Builds the upstream URL for a user's five most recently created repos.
fn repos_url(base: &str, username: &str) -> String {
    format!(
        "{}/users/{}/repos?per_page=5&sort=created",
        base,
        urlencoding::encode(username)
    )
}

/// GET /api/profile/github/{username}: forwards the upstream repo list.
/// Any upstream non-200 (unknown user included) is reported as not found.
pub async fn get_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut request = state
        .http
        .get(repos_url(GITHUB_API, &username))
        .header(reqwest::header::USER_AGENT, "devconnect")
        .header(reqwest::header::ACCEPT, "application/vnd.github+json");

    if let Some(token) = &state.github_token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!("github request failed: {}", e);
        ApiError::Internal
    })?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(ApiError::NotFound("No Github profile found"));
    }

    let body = response.json::<serde_json::Value>().await.map_err(|e| {
        tracing::error!("github response decode failed: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(body))
}
