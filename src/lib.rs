//! consent-guard: the request-protection core of a GDPR compliance service.
//!
//! Request throttling, sign-in lockout, DSAR deadline rules and the CORS
//! policy for the embeddable consent widget, served over a small Axum API.

pub mod admin;
pub mod clock;
pub mod config;
pub mod consent;
pub mod dsar;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod websites;

pub use config::schema::GuardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
