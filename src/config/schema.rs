//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for consent-guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address, public origin).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request throttle presets.
    pub rate_limit: RateLimitConfig,

    /// Failed-login lockout settings.
    pub login_guard: LoginGuardConfig,

    /// DSAR reporting settings.
    pub dsar: DsarConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    /// Websites registered for the embeddable widget.
    pub websites: Vec<WebsiteConfig>,

    /// Dashboard accounts allowed to sign in.
    pub accounts: Vec<AccountConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Origin the dashboard itself is served from. Always allowed by CORS.
    pub app_origin: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            app_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// One fixed-window budget.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct RatePolicyConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Requests allowed per window.
    pub max_requests: u32,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// How often expired windows are swept, in seconds.
    pub sweep_interval_secs: u64,

    /// Authentication endpoints.
    pub strict: RatePolicyConfig,

    /// Admin and dashboard API.
    pub standard: RatePolicyConfig,

    /// Read-only public endpoints (widget config).
    pub lenient: RatePolicyConfig,

    /// Public write endpoints (consent, DSAR submission).
    pub public_form: RatePolicyConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 60,
            strict: RatePolicyConfig {
                window_secs: 15 * 60,
                max_requests: 10,
            },
            standard: RatePolicyConfig {
                window_secs: 60,
                max_requests: 100,
            },
            lenient: RatePolicyConfig {
                window_secs: 60,
                max_requests: 300,
            },
            public_form: RatePolicyConfig {
                window_secs: 5 * 60,
                max_requests: 10,
            },
        }
    }
}

/// Failed-login lockout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginGuardConfig {
    /// Failures that trigger a lockout.
    pub max_attempts: u32,

    /// Lockout length in seconds.
    pub lockout_secs: u64,

    /// Failures older than this no longer count, in seconds.
    pub attempt_window_secs: u64,

    /// How often stale records are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for LoginGuardConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 15 * 60,
            attempt_window_secs: 15 * 60,
            sweep_interval_secs: 5 * 60,
        }
    }
}

/// DSAR reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DsarConfig {
    /// Open requests with this many days or fewer left count as "due soon".
    pub due_soon_days: i64,
}

impl Default for DsarConfig {
    fn default() -> Self {
        Self { due_soon_days: 7 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin API under `/admin`.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// A website registered for the consent widget.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebsiteConfig {
    /// Public identifier embedded in the widget snippet.
    pub id: String,

    /// Domain the widget is served on (e.g., "example.com").
    pub domain: String,

    /// Display name shown in the banner.
    pub name: String,

    #[serde(default = "default_banner_position")]
    pub banner_position: String,

    #[serde(default = "default_primary_color")]
    pub primary_color: String,

    #[serde(default = "default_language")]
    pub language: String,
}

fn default_banner_position() -> String {
    "bottom".to_string()
}

fn default_primary_color() -> String {
    "#1f2937".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// A dashboard account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    pub email: String,

    /// Argon2 hash of the password in PHC string form (`$argon2id$...`).
    /// `guard-cli hash <password>` prints one.
    pub password_hash: String,
}
