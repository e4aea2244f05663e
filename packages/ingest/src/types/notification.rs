//! Notifications produced by the pipeline.
//!
//! Notification kinds are a tagged union with a mandatory fallback arm, so
//! adding a kind is a compile-time-checked change and unknown kinds read
//! back from storage without failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The known notification kinds, plus a fallback for anything stored by a
/// newer (or older) version of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    /// A newly imported job matched a saved search
    SavedSearchMatch {
        saved_search_id: Uuid,
        job_id: Uuid,
        job_title: String,
    },

    /// An import run finished (admin/company visibility)
    ImportCompleted {
        run_id: Uuid,
        imported: usize,
        skipped: usize,
        failed: usize,
    },

    /// A zero-result search triggered an import that found new jobs
    NewJobsAvailable { search_term: String, count: usize },

    /// Unrecognized kind from another version of the system
    #[serde(other)]
    Other,
}

impl NotificationKind {
    /// Short label for logging and display dispatch.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::SavedSearchMatch { .. } => "saved_search_match",
            NotificationKind::ImportCompleted { .. } => "import_completed",
            NotificationKind::NewJobsAvailable { .. } => "new_jobs_available",
            NotificationKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient_id: Uuid, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}
