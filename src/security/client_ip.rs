//! Client identification for throttling and lockouts.
//!
//! The left-most `X-Forwarded-For` entry wins, then `X-Real-IP`. Clients with
//! neither share the [`UNKNOWN_CLIENT`] bucket and therefore one budget.

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Shared bucket for requests that carry no client address.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
