//! Websites registered for the consent widget.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::WebsiteConfig;

/// Consent categories the banner offers. `necessary` cannot be declined.
pub const CONSENT_CATEGORIES: [&str; 4] = ["necessary", "analytics", "marketing", "preferences"];

#[derive(Debug, Clone, Serialize)]
pub struct Website {
    pub id: String,
    pub domain: String,
    pub name: String,
    pub banner: BannerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerSettings {
    pub position: String,
    pub primary_color: String,
    pub language: String,
}

impl From<&WebsiteConfig> for Website {
    fn from(config: &WebsiteConfig) -> Self {
        Self {
            id: config.id.clone(),
            domain: config.domain.clone(),
            name: config.name.clone(),
            banner: BannerSettings {
                position: config.banner_position.clone(),
                primary_color: config.primary_color.clone(),
                language: config.language.clone(),
            },
        }
    }
}

/// Read-only lookup of registered websites by public id.
#[derive(Debug, Default)]
pub struct WebsiteRegistry {
    sites: HashMap<String, Website>,
}

impl WebsiteRegistry {
    pub fn from_config(websites: &[WebsiteConfig]) -> Self {
        Self {
            sites: websites
                .iter()
                .map(|w| (w.id.clone(), Website::from(w)))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Website> {
        self.sites.get(id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
