//! Registration, login, and current-user handlers.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::auth::{generate_token, AuthUser};
use super::AppState;
use crate::db::UserRepository;
use crate::error::{ApiError, FieldError};
use crate::models::User;

/// Hashes a password with a random salt. Stored as `salt$digest`.
pub fn hash_password(password: &str) -> String {
    use rand::Rng;

    let mut salt = [0u8; 16];
    rand::rng().fill(&mut salt);
    let salt = hex(&salt);

    format!("{}${}", salt, digest(&salt, password))
}

/// Checks a password against a stored `salt$digest` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex(&hasher.finalize())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Derives a gravatar-style avatar URL from the email's digest.
pub fn avatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&d=mm",
        hex(&hasher.finalize())
    )
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/users: register a new account, returning an auth token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError {
            param: "name",
            msg: "Name is required".to_string(),
        });
    }
    if !req.email.contains('@') {
        errors.push(FieldError {
            param: "email",
            msg: "Please include a valid email".to_string(),
        });
    }
    if req.password.len() < 6 {
        errors.push(FieldError {
            param: "password",
            msg: "Please enter a password with 6 or more characters".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let users = UserRepository::new(state.pool.clone());

    if users.get_by_email(&req.email).await?.is_some() {
        return Err(ApiError::validation("email", "User already exists"));
    }

    let user = User::new(
        req.name.trim(),
        req.email.trim(),
        hash_password(&req.password),
        avatar_url(&req.email),
    );
    users.create(&user).await?;
    tracing::info!("registered user {}", user.id);

    let token = generate_token();
    users.store_token(&token, user.id).await?;

    Ok(Json(TokenResponse { token }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth: exchange credentials for an auth token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = Vec::new();
    if req.email.trim().is_empty() {
        errors.push(FieldError {
            param: "email",
            msg: "Email is required".to_string(),
        });
    }
    if req.password.is_empty() {
        errors.push(FieldError {
            param: "password",
            msg: "Password is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let users = UserRepository::new(state.pool.clone());

    let user = users
        .get_by_email(&req.email)
        .await?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = generate_token();
    users.store_token(&token, user.id).await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /api/auth: the authenticated user, minus the password hash.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let user = users
        .get_by_id(identity.id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("hunter22"), hash_password("hunter22"));
    }

    #[test]
    fn test_malformed_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "no-dollar-sign"));
    }

    #[test]
    fn test_avatar_url_normalizes_email() {
        assert_eq!(avatar_url("Ada@Example.com "), avatar_url("ada@example.com"));
        assert!(avatar_url("ada@example.com").starts_with("https://www.gravatar.com/avatar/"));
    }
}
