//! Dashboard sign-in.
//!
//! The login guard is consulted before the password is checked, so a locked
//! pair is refused even with the right password.

use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_ip::client_identifier;
use crate::security::login_guard::{mask_email, normalize_email};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub session_id: Uuid,
    pub authenticated_at: DateTime<Utc>,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let ip = client_identifier(&headers);
    let email = normalize_email(&request.email);

    let status = state.login_guard.is_locked(&email, &ip);
    if status.locked {
        tracing::info!(email = %mask_email(&email), ip = %ip, "Sign-in refused: locked");
        return Err(ApiError::Locked {
            retry_after_secs: status.remaining_secs.unwrap_or_default(),
        });
    }

    if !state.accounts.verify(&email, &request.password) {
        metrics::record_login_failure();
        let status = state.login_guard.record_failure(&email, &ip);
        return Err(if status.locked {
            ApiError::Locked {
                retry_after_secs: status.remaining_secs.unwrap_or_default(),
            }
        } else {
            ApiError::InvalidCredentials {
                attempts_remaining: status.attempts_remaining.unwrap_or_default(),
            }
        });
    }

    state.login_guard.record_success(&email, &ip);
    tracing::info!(email = %mask_email(&email), ip = %ip, "Sign-in succeeded");

    Ok(Json(LoginResponse {
        email,
        session_id: Uuid::new_v4(),
        authenticated_at: state.clock.now(),
    }))
}
