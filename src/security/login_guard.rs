//! Failed-login tracking and temporary lockout.
//!
//! Records are keyed by `(normalized email, client ip)`. Failures inside the
//! attempt window accumulate; reaching `max_attempts` locks the pair for the
//! lockout period no matter what credentials arrive next. Any success clears
//! the record.
//!
//! A record whose window has elapsed without a lock is replaced on the next
//! failure, so a client that waits out every window always gets a fresh
//! budget.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::clock::{period_from_secs, saturating_add, secs_until, SharedClock};
use crate::config::LoginGuardConfig;
use crate::lifecycle::Sweep;
use crate::observability::metrics;

/// Thresholds for the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginGuardPolicy {
    pub max_attempts: u32,
    pub lockout: TimeDelta,
    pub attempt_window: TimeDelta,
}

impl From<&LoginGuardConfig> for LoginGuardPolicy {
    fn from(config: &LoginGuardConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            lockout: period_from_secs(config.lockout_secs),
            attempt_window: period_from_secs(config.attempt_window_secs),
        }
    }
}

impl Default for LoginGuardPolicy {
    fn default() -> Self {
        Self::from(&LoginGuardConfig::default())
    }
}

/// Lock state reported to the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
}

impl LockStatus {
    fn open(attempts_remaining: u32) -> Self {
        Self {
            locked: false,
            remaining_secs: None,
            attempts_remaining: Some(attempts_remaining),
        }
    }

    fn locked(remaining_secs: u64) -> Self {
        Self {
            locked: true,
            remaining_secs: Some(remaining_secs),
            attempts_remaining: None,
        }
    }
}

/// An active lockout, as listed by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockoutEntry {
    pub email: String,
    pub ip: String,
    pub failed_attempts: u32,
    pub locked_until: DateTime<Utc>,
    pub remaining_secs: u64,
}

/// Credential-guessing brake consulted around every password check.
pub trait LoginGuard: Sweep {
    fn is_locked(&self, email: &str, ip: &str) -> LockStatus;

    fn record_failure(&self, email: &str, ip: &str) -> LockStatus;

    fn record_success(&self, email: &str, ip: &str);

    /// Administrative override. Returns whether a record existed.
    fn unlock(&self, email: &str, ip: &str) -> bool;

    fn active_lockouts(&self) -> Vec<LockoutEntry>;
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `j***@example.com`, for logs.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[derive(Debug, Clone)]
struct AttemptRecord {
    count: u32,
    first_attempt_at: DateTime<Utc>,
    last_attempt_at: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            first_attempt_at: now,
            last_attempt_at: now,
            locked_until: None,
        }
    }

    fn active_lock(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until.filter(|until| now < *until)
    }

    /// Stale records no longer say anything about the key: the lock has run
    /// out, or the window closed without one.
    fn is_stale(&self, now: DateTime<Utc>, policy: &LoginGuardPolicy) -> bool {
        match self.locked_until {
            Some(until) => now >= until,
            None => now - self.first_attempt_at >= policy.attempt_window,
        }
    }

    /// Sweep criterion. An expired lock is kept while the key is still active.
    fn is_sweepable(&self, now: DateTime<Utc>, policy: &LoginGuardPolicy) -> bool {
        match self.locked_until {
            Some(until) => now >= until && now - self.last_attempt_at >= policy.attempt_window,
            None => now - self.first_attempt_at >= policy.attempt_window,
        }
    }
}

/// Login guard state held in process memory.
pub struct MemoryLoginGuard {
    records: DashMap<(String, String), AttemptRecord>,
    policy: LoginGuardPolicy,
    clock: SharedClock,
}

impl MemoryLoginGuard {
    pub fn new(policy: LoginGuardPolicy, clock: SharedClock) -> Self {
        Self {
            records: DashMap::new(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &LoginGuardPolicy {
        &self.policy
    }

    fn key(email: &str, ip: &str) -> (String, String) {
        (normalize_email(email), ip.to_string())
    }
}

impl LoginGuard for MemoryLoginGuard {
    fn is_locked(&self, email: &str, ip: &str) -> LockStatus {
        let key = Self::key(email, ip);
        let now = self.clock.now();

        if let Some(record) = self.records.get(&key) {
            if let Some(until) = record.active_lock(now) {
                return LockStatus::locked(secs_until(until, now));
            }
            if !record.is_stale(now, &self.policy) {
                return LockStatus::open(self.policy.max_attempts.saturating_sub(record.count));
            }
        }

        self.records
            .remove_if(&key, |_, record| record.is_stale(now, &self.policy));
        LockStatus::open(self.policy.max_attempts)
    }

    fn record_failure(&self, email: &str, ip: &str) -> LockStatus {
        let key = Self::key(email, ip);
        let now = self.clock.now();
        let masked = mask_email(&key.0);

        let mut record = self
            .records
            .entry(key)
            .or_insert_with(|| AttemptRecord::fresh(now));

        if let Some(until) = record.active_lock(now) {
            record.last_attempt_at = now;
            return LockStatus::locked(secs_until(until, now));
        }
        if record.is_stale(now, &self.policy) {
            *record = AttemptRecord::fresh(now);
        }

        record.count += 1;
        record.last_attempt_at = now;

        if record.count >= self.policy.max_attempts {
            let until = saturating_add(now, self.policy.lockout);
            record.locked_until = Some(until);
            tracing::warn!(
                email = %masked,
                ip = %ip,
                attempts = record.count,
                locked_until = %until,
                "Sign-in locked after repeated failures"
            );
            metrics::record_lockout();
            return LockStatus {
                locked: true,
                remaining_secs: Some(secs_until(until, now)),
                attempts_remaining: Some(0),
            };
        }

        tracing::debug!(email = %masked, attempts = record.count, "Failed sign-in recorded");
        LockStatus::open(self.policy.max_attempts - record.count)
    }

    fn record_success(&self, email: &str, ip: &str) {
        self.records.remove(&Self::key(email, ip));
    }

    fn unlock(&self, email: &str, ip: &str) -> bool {
        let removed = self.records.remove(&Self::key(email, ip)).is_some();
        if removed {
            tracing::info!(email = %mask_email(email), ip = %ip, "Sign-in lock cleared by admin");
        }
        removed
    }

    fn active_lockouts(&self) -> Vec<LockoutEntry> {
        let now = self.clock.now();
        let mut entries: Vec<LockoutEntry> = self
            .records
            .iter()
            .filter_map(|r| {
                let until = r.value().active_lock(now)?;
                let (email, ip) = r.key();
                Some(LockoutEntry {
                    email: email.clone(),
                    ip: ip.clone(),
                    failed_attempts: r.value().count,
                    locked_until: until,
                    remaining_secs: secs_until(until, now),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.locked_until.cmp(&b.locked_until));
        entries
    }
}

impl Sweep for MemoryLoginGuard {
    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_sweepable(now, &self.policy);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}
