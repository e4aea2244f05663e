//! Import run bookkeeping: one row per pipeline invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::job::JobSource;

/// Lifecycle state of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "running" => RunStatus::Running,
            "failed" => RunStatus::Failed,
            _ => RunStatus::Completed,
        }
    }
}

/// One execution of the ingestion pipeline and its outcome counters.
///
/// Created `Running` at the start of an invocation, mutated only by the
/// importer that owns it, and finalized exactly once. `Failed` is reserved
/// for runs that could not start at all; a run with some failed records
/// still finalizes as `Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: Uuid,
    pub source: JobSource,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of records handed to the importer
    pub requested: usize,
    pub imported: usize,
    /// Duplicates skipped via the dedup key
    pub skipped: usize,
    pub failed: usize,
}

impl ImportRun {
    pub fn new(source: JobSource, requested: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            status: RunStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            requested,
            imported: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn is_finalized(&self) -> bool {
        self.status != RunStatus::Running
    }
}

/// Counters reported back to the caller of an import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Ids of the records actually inserted during this import
    #[serde(default)]
    pub job_ids: Vec<Uuid>,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.imported + self.skipped + self.failed
    }
}
