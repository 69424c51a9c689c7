//! Canned responses shared by middleware and handlers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::security::cors::CorsDecision;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// 429 with `Retry-After` and the `X-RateLimit-*` headers.
/// `X-RateLimit-Reset` is the unix time the window closes.
pub fn rate_limited(limit: u32, retry_after_secs: u64, reset_at: DateTime<Utc>) -> Response {
    let body = Json(json!({
        "error": "Too many requests. Please try again later.",
        "retry_after": retry_after_secs,
    }));
    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();

    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from_static("0"));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_at.timestamp()));
    response
}

pub fn with_cors(mut response: Response, cors: &CorsDecision) -> Response {
    cors.apply(response.headers_mut());
    response
}
