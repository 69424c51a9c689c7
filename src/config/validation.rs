//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and references.
//! Every problem is reported, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use argon2::password_hash::PasswordHash;
use thiserror::Error;
use url::Url;

use crate::clock::MAX_PERIOD_SECS;
use crate::config::schema::{GuardConfig, RatePolicyConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "must be a socket address such as 0.0.0.0:8080",
        ));
    }
    match Url::parse(&config.listener.app_origin) {
        Ok(url) if url.host_str().is_some() => {}
        _ => errors.push(ValidationError::new(
            "listener.app_origin",
            "must be an absolute origin such as https://app.example.com",
        )),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be positive"));
    }

    let rate_limit = &config.rate_limit;
    if rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.sweep_interval_secs",
            "must be positive",
        ));
    }
    for (name, policy) in [
        ("strict", &rate_limit.strict),
        ("standard", &rate_limit.standard),
        ("lenient", &rate_limit.lenient),
        ("public_form", &rate_limit.public_form),
    ] {
        check_policy(name, policy, &mut errors);
    }

    let guard = &config.login_guard;
    if guard.max_attempts == 0 {
        errors.push(ValidationError::new("login_guard.max_attempts", "must be at least 1"));
    }
    check_period("login_guard.lockout_secs", guard.lockout_secs, &mut errors);
    check_period(
        "login_guard.attempt_window_secs",
        guard.attempt_window_secs,
        &mut errors,
    );
    if guard.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "login_guard.sweep_interval_secs",
            "must be positive",
        ));
    }

    if config.dsar.due_soon_days < 0 {
        errors.push(ValidationError::new("dsar.due_soon_days", "must not be negative"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must not be empty"));
    }

    let mut seen = HashSet::new();
    for (i, site) in config.websites.iter().enumerate() {
        if site.id.trim().is_empty() {
            errors.push(ValidationError::new(format!("websites[{i}].id"), "must not be empty"));
        } else if !seen.insert(site.id.as_str()) {
            errors.push(ValidationError::new(
                format!("websites[{i}].id"),
                format!("duplicate website id '{}'", site.id),
            ));
        }
        if site.domain.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("websites[{i}].domain"),
                "must not be empty",
            ));
        }
    }

    for (i, account) in config.accounts.iter().enumerate() {
        if !account.email.contains('@') {
            errors.push(ValidationError::new(
                format!("accounts[{i}].email"),
                "must be an email address",
            ));
        }
        if PasswordHash::new(account.password_hash.trim()).is_err() {
            errors.push(ValidationError::new(
                format!("accounts[{i}].password_hash"),
                "must be an Argon2 PHC string such as $argon2id$v=19$...",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_period(field: &str, secs: u64, errors: &mut Vec<ValidationError>) {
    if secs == 0 {
        errors.push(ValidationError::new(field, "must be positive"));
    } else if secs > MAX_PERIOD_SECS {
        errors.push(ValidationError::new(
            field,
            format!("must be at most {MAX_PERIOD_SECS} (one year)"),
        ));
    }
}

fn check_policy(name: &str, policy: &RatePolicyConfig, errors: &mut Vec<ValidationError>) {
    check_period(
        &format!("rate_limit.{name}.window_secs"),
        policy.window_secs,
        errors,
    );
    if policy.max_requests == 0 {
        errors.push(ValidationError::new(
            format!("rate_limit.{name}.max_requests"),
            "must be at least 1",
        ));
    }
}
