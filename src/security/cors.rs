//! Origin checks for the embeddable widget API.
//!
//! A browser origin is allowed when its host is the registered website's
//! host (with or without `www.`) or when it is the dashboard's own origin.
//! Allowed origins are echoed back; anything else is pinned to the app origin
//! so the browser refuses to expose the response.

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
pub const PREFLIGHT_MAX_AGE_SECS: u32 = 86_400;

/// The header set to send back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allow_origin: String,
    pub permissive: bool,
}

impl CorsDecision {
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(origin) = HeaderValue::from_str(&self.allow_origin) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        if self.permissive {
            headers.insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from(PREFLIGHT_MAX_AGE_SECS),
            );
        }
    }
}

/// Decide the CORS headers for a request.
///
/// `website_domain` is the domain the widget was registered for, as typed by
/// the customer ("example.com", "https://www.example.com/", ...).
pub fn resolve(origin: Option<&str>, website_domain: Option<&str>, app_origin: &str) -> CorsDecision {
    let restrictive = CorsDecision {
        allow_origin: app_origin.to_string(),
        permissive: false,
    };

    let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
        return restrictive;
    };
    let Ok(origin_url) = Url::parse(origin) else {
        return restrictive;
    };

    let matches_site = website_domain
        .and_then(site_host)
        .zip(normalized_host(&origin_url))
        .is_some_and(|(site, origin_host)| site == origin_host);

    let matches_app = Url::parse(app_origin)
        .map(|app| app.origin() == origin_url.origin())
        .unwrap_or(false);

    if matches_site || matches_app {
        CorsDecision {
            allow_origin: origin.to_string(),
            permissive: true,
        }
    } else {
        restrictive
    }
}

fn site_host(domain: &str) -> Option<String> {
    let domain = domain.trim();
    if domain.contains("://") {
        normalized_host(&Url::parse(domain).ok()?)
    } else {
        normalized_host(&Url::parse(&format!("https://{domain}")).ok()?)
    }
}

fn normalized_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => host,
    })
}
