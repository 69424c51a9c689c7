//! DSAR deadline rules.
//!
//! GDPR Art. 12(3) gives controllers one month to answer; this service uses a
//! flat 30 days from submission. All functions are pure and take `now`
//! explicitly.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::clock::ceil_div;
use crate::dsar::types::DsarStatus;

pub const RESPONSE_DAYS: i64 = 30;

pub fn calculate_due_date(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + TimeDelta::days(RESPONSE_DAYS)
}

/// Open requests are overdue strictly after their due date.
pub fn is_overdue(due_date: DateTime<Utc>, status: DsarStatus, now: DateTime<Utc>) -> bool {
    !status.is_terminal() && now > due_date
}

/// Whole days left, rounded up. Negative once the due date has passed.
pub fn days_remaining(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_div(due_date - now, TimeDelta::days(1))
}

/// Deadline attributes computed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeadlineView {
    pub is_overdue: bool,
    pub days_remaining: i64,
}

impl DeadlineView {
    pub fn evaluate(due_date: DateTime<Utc>, status: DsarStatus, now: DateTime<Utc>) -> Self {
        Self {
            is_overdue: is_overdue(due_date, status, now),
            days_remaining: days_remaining(due_date, now),
        }
    }
}
