//! Crate-wide API error taxonomy.
//!
//! Every handler failure maps onto one of four HTTP shapes:
//! field validation → 400, missing document or malformed id → 404,
//! authorization failure → 401, anything else → 500 with a generic body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A single failed field check, matching the wire shape
/// `{"param": "...", "msg": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub param: &'static str,
    pub msg: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid request fields → 400 with per-field messages.
    Validation(Vec<FieldError>),
    /// Missing document, or an identifier that does not parse → 404.
    NotFound(&'static str),
    /// Caller is not allowed to perform the mutation → 401.
    Unauthorized(&'static str),
    /// Any other failure → 500. Details are logged, never returned.
    Internal,
}

impl ApiError {
    pub fn validation(param: &'static str, msg: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError {
            param,
            msg: msg.into(),
        }])
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "validation failed:")?;
                for e in errors {
                    write!(f, " {}: {};", e.param, e.msg)?;
                }
                Ok(())
            }
            ApiError::NotFound(msg) => write!(f, "not found: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            ApiError::Internal => write!(f, "internal error"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::Internal
    }
}

#[derive(Serialize)]
struct ErrorsBody {
    errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct MessageBody {
    msg: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorsBody { errors })).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(MessageBody { msg })).into_response()
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(MessageBody { msg })).into_response()
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageBody { msg: "Server error" }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_shape() {
        let err = ApiError::validation("text", "Text is required");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_statuses() {
        assert_eq!(
            ApiError::NotFound("No post found").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("nope").into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sqlx_errors_are_masked() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::Internal));
    }
}
