//! Consent events posted by the embedded banner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_VISITOR_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentAction {
    AcceptAll,
    RejectAll,
    Custom,
}

impl ConsentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentAction::AcceptAll => "accept_all",
            ConsentAction::RejectAll => "reject_all",
            ConsentAction::Custom => "custom",
        }
    }
}

/// Per-category choices. `necessary` is always granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentChoices {
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub preferences: bool,
}

impl ConsentChoices {
    /// The choices that actually apply for `action`. Only `custom` looks at
    /// what the visitor ticked.
    pub fn effective(self, action: ConsentAction) -> Self {
        match action {
            ConsentAction::AcceptAll => Self {
                necessary: true,
                analytics: true,
                marketing: true,
                preferences: true,
            },
            ConsentAction::RejectAll => Self {
                necessary: true,
                ..Self::default()
            },
            ConsentAction::Custom => Self {
                necessary: true,
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsentSubmission {
    pub website_id: String,
    pub visitor_id: String,
    pub action: ConsentAction,
    #[serde(default)]
    pub categories: ConsentChoices,
}

impl ConsentSubmission {
    pub fn validate(&self) -> Result<(), String> {
        let visitor = self.visitor_id.trim();
        if visitor.is_empty() {
            return Err("visitor_id must not be empty".into());
        }
        if visitor.chars().count() > MAX_VISITOR_ID_LEN {
            return Err(format!(
                "visitor_id must be at most {MAX_VISITOR_ID_LEN} characters"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentReceipt {
    pub consent_id: Uuid,
    pub website_id: String,
    pub action: ConsentAction,
    pub categories: ConsentChoices,
    pub recorded_at: DateTime<Utc>,
}
