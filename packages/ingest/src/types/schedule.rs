//! Configured import schedules, iterated by the server's cron tick.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::job::{JobSource, SearchParams};

/// One recurring import, e.g. "pull 'engineer' jobs from the API hourly".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSchedule {
    pub id: Uuid,
    pub source: JobSource,
    pub query: SearchParams,
    pub frequency_minutes: i64,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl ImportSchedule {
    pub fn new(source: JobSource, query: SearchParams, frequency_minutes: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            query,
            frequency_minutes,
            enabled: true,
            last_run_at: None,
        }
    }

    /// Whether this schedule should run at `now`. Never-run schedules are
    /// always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_run_at {
            None => true,
            Some(last) => last + Duration::minutes(self.frequency_minutes) <= now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_run_schedule_is_due() {
        let schedule = ImportSchedule::new(JobSource::Api, SearchParams::new("rust"), 60);
        assert!(schedule.is_due(Utc::now()));
    }

    #[test]
    fn test_disabled_schedule_is_never_due() {
        let mut schedule = ImportSchedule::new(JobSource::Api, SearchParams::new("rust"), 60);
        schedule.enabled = false;
        assert!(!schedule.is_due(Utc::now()));
    }

    #[test]
    fn test_due_after_frequency_elapses() {
        let now = Utc::now();
        let mut schedule = ImportSchedule::new(JobSource::Api, SearchParams::new("rust"), 60);

        schedule.last_run_at = Some(now - Duration::minutes(30));
        assert!(!schedule.is_due(now));

        schedule.last_run_at = Some(now - Duration::minutes(61));
        assert!(schedule.is_due(now));
    }
}
