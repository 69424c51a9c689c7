//! DSAR records and their vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The right a data subject is exercising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DsarRequestType {
    Access,
    Erasure,
    Rectification,
    Portability,
    Restriction,
    Objection,
}

impl DsarRequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DsarRequestType::Access => "access",
            DsarRequestType::Erasure => "erasure",
            DsarRequestType::Rectification => "rectification",
            DsarRequestType::Portability => "portability",
            DsarRequestType::Restriction => "restriction",
            DsarRequestType::Objection => "objection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DsarStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl DsarStatus {
    /// Completed and rejected requests no longer have a deadline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DsarStatus::Completed | DsarStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DsarStatus::Pending => "pending",
            DsarStatus::InProgress => "in_progress",
            DsarStatus::Completed => "completed",
            DsarStatus::Rejected => "rejected",
        }
    }
}

/// A stored data subject request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsarRecord {
    pub id: Uuid,
    pub website_id: String,
    pub requester_email: String,
    pub requester_name: Option<String>,
    pub request_type: DsarRequestType,
    pub details: Option<String>,
    pub status: DsarStatus,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// What a requester submits.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDsar {
    pub website_id: String,
    pub requester_email: String,
    #[serde(default)]
    pub requester_name: Option<String>,
    pub request_type: DsarRequestType,
    #[serde(default)]
    pub details: Option<String>,
}
