//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, TimeZone, Utc};
use tokio::net::TcpListener;

use consent_guard::clock::{ManualClock, SharedClock};
use consent_guard::config::{AccountConfig, GuardConfig, WebsiteConfig};
use consent_guard::security::credentials::hash_password_with;
use consent_guard::{HttpServer, Shutdown};

pub const SITE_ID: &str = "site-1";
pub const SITE_DOMAIN: &str = "example.com";
pub const APP_ORIGIN: &str = "https://app.consentguard.test";
pub const ADMIN_KEY: &str = "test-admin-key";
pub const ACCOUNT_EMAIL: &str = "owner@example.com";
pub const ACCOUNT_PASSWORD: &str = "correct horse battery staple";

/// A config with one website, one account and the admin API on.
pub fn test_config() -> GuardConfig {
    let mut config = GuardConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.listener.app_origin = APP_ORIGIN.into();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.into();
    config.websites.push(WebsiteConfig {
        id: SITE_ID.into(),
        domain: SITE_DOMAIN.into(),
        name: "Example Shop".into(),
        banner_position: "bottom".into(),
        primary_color: "#1f2937".into(),
        language: "en".into(),
    });
    config.accounts.push(AccountConfig {
        email: ACCOUNT_EMAIL.into(),
        password_hash: quick_hash(ACCOUNT_PASSWORD),
    });
    config
}

/// Argon2id with small parameters so sign-in tests stay fast. The
/// parameters are stored in the hash, so the server verifies it as is.
pub fn quick_hash(password: &str) -> String {
    let params = Params::new(1024, 1, 1, None).unwrap();
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    hash_password_with(&argon2, password).unwrap()
}

pub fn manual_clock(start: DateTime<Utc>) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start))
}

pub fn jan_first_2024() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Start a server on an ephemeral port. Keep the returned [`Shutdown`]
/// alive for as long as the server should run.
pub async fn start_server(config: GuardConfig, clock: SharedClock) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_clock(config, clock);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (addr, shutdown)
}

pub fn admin_client() -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {ADMIN_KEY}").parse().unwrap(),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap()
}
