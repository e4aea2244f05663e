//! Saved searches: user-persisted filter sets, optionally subscribed to
//! notifications on new matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::job::JobRecord;

/// Filter vocabulary shared by interactive search and saved searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilters {
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub employment_type: Option<String>,
}

impl JobFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = Some(employment_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.location.is_none()
            && self.category.is_none()
            && self.employment_type.is_none()
    }

    /// Whether a record matches every set filter. Text matching is
    /// case-insensitive substring; the search term matches against title,
    /// description, and company name.
    pub fn matches(&self, job: &JobRecord) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                job.title.to_lowercase(),
                job.description.to_lowercase(),
                job.company_name.as_deref().unwrap_or("").to_lowercase()
            );
            if !haystack.contains(&term) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            let job_location = job.location.as_deref().unwrap_or("").to_lowercase();
            if !job_location.contains(&location.to_lowercase()) {
                return false;
            }
        }

        if let Some(category) = &self.category {
            let job_category = job.category.as_deref().unwrap_or("").to_lowercase();
            if job_category != category.to_lowercase() {
                return false;
            }
        }

        if let Some(employment_type) = &self.employment_type {
            let job_type = job.employment_type.as_deref().unwrap_or("").to_lowercase();
            if job_type != employment_type.to_lowercase() {
                return false;
            }
        }

        true
    }
}

/// A user-owned saved search. Deleted explicitly by its owner; no cascading
/// lifecycle beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub filters: JobFilters,
    pub notify_on_new_matches: bool,
    pub created_at: DateTime<Utc>,
}

impl SavedSearch {
    pub fn new(owner_id: Uuid, name: impl Into<String>, filters: JobFilters) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            filters,
            notify_on_new_matches: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_notifications(mut self) -> Self {
        self.notify_on_new_matches = true;
        self
    }
}
