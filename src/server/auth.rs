//! Bearer-token authentication.
//!
//! Tokens are opaque 32-byte random strings issued at registration/login and
//! persisted in the store. The middleware resolves `Authorization: Bearer`
//! headers to a user id and attaches it to the request; handlers read it back
//! through the [`AuthUser`] extension.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::AppState;
use crate::db::UserRepository;
use crate::error::ApiError;

/// Authenticated identity, added to request extensions after auth.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Generates an opaque auth token.
///
/// Returns 32 random bytes encoded as base64url (no padding).
pub fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Authentication middleware for private routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        Some(_) => {
            return ApiError::Unauthorized("Authorization header must use Bearer scheme")
                .into_response();
        }
        None => {
            return ApiError::Unauthorized("No token, authorization denied").into_response();
        }
    };

    let users = UserRepository::new(state.pool.clone());
    match users.user_id_for_token(token).await {
        Ok(Some(id)) => {
            request.extensions_mut().insert(AuthUser { id });
            next.run(request).await
        }
        Ok(None) => ApiError::Unauthorized("Token is not valid").into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();

        // 32 bytes base64url = 43 chars
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
