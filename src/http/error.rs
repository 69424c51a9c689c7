use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dsar::DsarError;

/// Errors returned by handlers. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid email or password. {attempts_remaining} attempt(s) remaining before lockout.")]
    InvalidCredentials { attempts_remaining: u32 },

    #[error("Too many failed sign-in attempts. Try again in {retry_after_secs} seconds.")]
    Locked { retry_after_secs: u64 },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Locked { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<DsarError> for ApiError {
    fn from(err: DsarError) -> Self {
        match err {
            DsarError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DsarError::Finalized { .. } => ApiError::Conflict(err.to_string()),
            DsarError::Invalid(msg) => ApiError::Validation(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if let ApiError::Locked { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_locked_carries_retry_after() {
        let response = ApiError::Locked {
            retry_after_secs: 900,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "900");
    }

    #[test]
    fn test_dsar_errors_map_to_status() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(DsarError::NotFound(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DsarError::Finalized {
                id,
                status: "completed"
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DsarError::Invalid("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_credentials_message() {
        let err = ApiError::InvalidCredentials {
            attempts_remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "Invalid email or password. 1 attempt(s) remaining before lockout."
        );
    }
}
