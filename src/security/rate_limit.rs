//! Fixed-window request throttling.
//!
//! Every `(client, path)` pair gets a counter that lives until its window
//! closes. The first request after the window closes starts a fresh window
//! instead of incrementing the old one.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::clock::{period_from_secs, saturating_add, secs_until, SharedClock};
use crate::config::{RateLimitConfig, RatePolicyConfig};
use crate::http::response::rate_limited;
use crate::lifecycle::Sweep;
use crate::observability::metrics;
use crate::security::client_ip::client_identifier;

/// Named budgets. Each maps to a [`RatePolicy`] in [`RateLimitConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatePreset {
    Strict,
    Standard,
    Lenient,
    PublicForm,
}

impl RatePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatePreset::Strict => "strict",
            RatePreset::Standard => "standard",
            RatePreset::Lenient => "lenient",
            RatePreset::PublicForm => "public_form",
        }
    }

    pub fn policy(&self, config: &RateLimitConfig) -> RatePolicy {
        let policy = match self {
            RatePreset::Strict => &config.strict,
            RatePreset::Standard => &config.standard,
            RatePreset::Lenient => &config.lenient,
            RatePreset::PublicForm => &config.public_form,
        };
        RatePolicy::from(policy)
    }
}

/// Window length and request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub window: TimeDelta,
    pub max_requests: u32,
}

impl RatePolicy {
    pub fn new(window: TimeDelta, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
        }
    }
}

impl From<&RatePolicyConfig> for RatePolicy {
    fn from(config: &RatePolicyConfig) -> Self {
        Self::new(period_from_secs(config.window_secs), config.max_requests)
    }
}

/// Outcome of a throttle check. Rejection is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allow {
        limit: u32,
        remaining: u32,
        reset_at: DateTime<Utc>,
    },
    Reject {
        limit: u32,
        retry_after_secs: u64,
        reset_at: DateTime<Utc>,
    },
}

impl ThrottleDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ThrottleDecision::Allow { .. })
    }
}

/// Per-key request counter.
///
/// The in-process implementation is [`MemoryThrottle`]. A multi-node
/// deployment needs an implementation over a shared TTL store.
pub trait RequestThrottle: Sweep {
    fn check(&self, identifier: &str, resource_path: &str, policy: RatePolicy) -> ThrottleDecision;

    /// Number of live `(client, path)` records.
    fn tracked(&self) -> usize;
}

#[derive(Debug, Clone)]
struct ThrottleRecord {
    count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Throttle state held in process memory.
///
/// The check-then-increment runs under the DashMap shard lock for the key, so
/// concurrent requests for the same key never lose an increment.
pub struct MemoryThrottle {
    records: DashMap<(String, String), ThrottleRecord>,
    clock: SharedClock,
}

impl MemoryThrottle {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }
}

impl RequestThrottle for MemoryThrottle {
    fn check(&self, identifier: &str, resource_path: &str, policy: RatePolicy) -> ThrottleDecision {
        let now = self.clock.now();
        let limit = policy.max_requests;

        let mut record = self
            .records
            .entry((identifier.to_owned(), resource_path.to_owned()))
            .or_insert_with(|| ThrottleRecord {
                count: 0,
                window_reset_at: now,
            });

        if now >= record.window_reset_at {
            *record = ThrottleRecord {
                count: 1,
                window_reset_at: saturating_add(now, policy.window),
            };
            return ThrottleDecision::Allow {
                limit,
                remaining: limit.saturating_sub(1),
                reset_at: record.window_reset_at,
            };
        }

        record.count = record.count.saturating_add(1);
        if record.count > limit {
            ThrottleDecision::Reject {
                limit,
                retry_after_secs: secs_until(record.window_reset_at, now).max(1),
                reset_at: record.window_reset_at,
            }
        } else {
            ThrottleDecision::Allow {
                limit,
                remaining: limit - record.count,
                reset_at: record.window_reset_at,
            }
        }
    }

    fn tracked(&self) -> usize {
        self.records.len()
    }
}

impl Sweep for MemoryThrottle {
    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.records.retain(|_, record| {
            let live = now < record.window_reset_at;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }
}

/// State for one throttled group of routes.
#[derive(Clone)]
pub struct ThrottleLayerState {
    pub throttle: Arc<dyn RequestThrottle>,
    pub preset: RatePreset,
    pub policy: RatePolicy,
    pub enabled: bool,
}

/// Middleware that answers 429 once a client spends its budget for a path.
///
/// CORS preflights are never counted.
pub async fn rate_limit_middleware(
    State(state): State<ThrottleLayerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.enabled || request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let client = client_identifier(request.headers());
    let path = request.uri().path().to_owned();

    match state.throttle.check(&client, &path, state.policy) {
        ThrottleDecision::Allow { .. } => next.run(request).await,
        ThrottleDecision::Reject {
            limit,
            retry_after_secs,
            reset_at,
        } => {
            tracing::warn!(
                client = %client,
                path = %path,
                preset = state.preset.as_str(),
                retry_after_secs,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited(state.preset.as_str());
            rate_limited(limit, retry_after_secs, reset_at)
        }
    }
}
