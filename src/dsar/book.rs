//! In-memory register of submitted DSARs.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::dsar::deadline::{calculate_due_date, DeadlineView};
use crate::dsar::types::{DsarRecord, DsarStatus, NewDsar};

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 200;
const MAX_DETAILS_LEN: usize = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DsarError {
    #[error("request {0} not found")]
    NotFound(Uuid),

    #[error("request {id} is already {status} and cannot change")]
    Finalized { id: Uuid, status: &'static str },

    #[error("{0}")]
    Invalid(String),
}

/// A record with its deadline attributes, as shown on dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct DsarView {
    #[serde(flatten)]
    pub record: DsarRecord,
    #[serde(flatten)]
    pub deadline: DeadlineView,
}

impl DsarView {
    pub fn new(record: DsarRecord, now: DateTime<Utc>) -> Self {
        let deadline = DeadlineView::evaluate(record.due_date, record.status, now);
        Self { record, deadline }
    }
}

/// Counts for the dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DsarSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub rejected: usize,
    pub overdue: usize,
    /// Open, not yet overdue, with `due_soon_days` or fewer left.
    pub due_soon: usize,
}

impl DsarSummary {
    pub fn from_views<'a>(views: impl IntoIterator<Item = &'a DsarView>, due_soon_days: i64) -> Self {
        let mut summary = Self::default();
        for view in views {
            summary.total += 1;
            match view.record.status {
                DsarStatus::Pending => summary.pending += 1,
                DsarStatus::InProgress => summary.in_progress += 1,
                DsarStatus::Completed => summary.completed += 1,
                DsarStatus::Rejected => summary.rejected += 1,
            }
            if view.deadline.is_overdue {
                summary.overdue += 1;
            } else if !view.record.status.is_terminal()
                && view.deadline.days_remaining <= due_soon_days
            {
                summary.due_soon += 1;
            }
        }
        summary
    }
}

pub struct DsarBook {
    records: DashMap<Uuid, DsarRecord>,
    clock: SharedClock,
}

impl DsarBook {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    pub fn submit(&self, request: NewDsar) -> Result<DsarRecord, DsarError> {
        let email = request.requester_email.trim();
        if email.is_empty() || email.len() > MAX_EMAIL_LEN || !email.contains('@') {
            return Err(DsarError::Invalid(
                "requester_email must be a valid email address".into(),
            ));
        }
        let name = request
            .requester_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if name.as_ref().is_some_and(|n| n.chars().count() > MAX_NAME_LEN) {
            return Err(DsarError::Invalid(format!(
                "requester_name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if request
            .details
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DETAILS_LEN)
        {
            return Err(DsarError::Invalid(format!(
                "details must be at most {MAX_DETAILS_LEN} characters"
            )));
        }

        let now = self.clock.now();
        let record = DsarRecord {
            id: Uuid::new_v4(),
            website_id: request.website_id,
            requester_email: email.to_string(),
            requester_name: name,
            request_type: request.request_type,
            details: request.details,
            status: DsarStatus::Pending,
            created_at: now,
            due_date: calculate_due_date(now),
            updated_at: now,
            resolved_at: None,
        };
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> Option<DsarView> {
        let record = self.records.get(&id)?.value().clone();
        Some(DsarView::new(record, self.clock.now()))
    }

    /// Every request, oldest first.
    pub fn list(&self) -> Vec<DsarView> {
        let now = self.clock.now();
        let mut views: Vec<DsarView> = self
            .records
            .iter()
            .map(|r| DsarView::new(r.value().clone(), now))
            .collect();
        views.sort_by(|a, b| a.record.created_at.cmp(&b.record.created_at));
        views
    }

    /// Move a request to a new status. Completed and rejected are final.
    pub fn update_status(&self, id: Uuid, status: DsarStatus) -> Result<DsarView, DsarError> {
        let now = self.clock.now();
        let mut record = self.records.get_mut(&id).ok_or(DsarError::NotFound(id))?;

        if record.status.is_terminal() && record.status != status {
            return Err(DsarError::Finalized {
                id,
                status: record.status.as_str(),
            });
        }
        if record.status != status {
            record.status = status;
            record.updated_at = now;
            if status.is_terminal() {
                record.resolved_at = Some(now);
            }
        }

        Ok(DsarView::new(record.clone(), now))
    }

    pub fn summary(&self, due_soon_days: i64) -> DsarSummary {
        DsarSummary::from_views(&self.list(), due_soon_days)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
