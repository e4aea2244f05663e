//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{
    InsertOutcome, JobStore, NotificationStore, RunStore, SavedSearchStore, ScheduleStore,
};
use crate::types::{
    job::{JobRecord, JobSource},
    notification::Notification,
    run::{ImportRun, RunStatus},
    saved_search::{JobFilters, SavedSearch},
    schedule::ImportSchedule,
};

/// In-memory store keyed by the dedup key.
///
/// Useful for testing and development. Not suitable for production as data
/// is lost on restart.
pub struct MemoryStore {
    jobs: RwLock<HashMap<(JobSource, String), JobRecord>>,
    runs: RwLock<HashMap<Uuid, ImportRun>>,
    saved_searches: RwLock<HashMap<Uuid, SavedSearch>>,
    notifications: RwLock<Vec<Notification>>,
    schedules: RwLock<HashMap<Uuid, ImportSchedule>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            runs: RwLock::new(HashMap::new()),
            saved_searches: RwLock::new(HashMap::new()),
            notifications: RwLock::new(Vec::new()),
            schedules: RwLock::new(HashMap::new()),
        }
    }

    pub fn clear(&self) {
        self.jobs.write().unwrap().clear();
        self.runs.write().unwrap().clear();
        self.saved_searches.write().unwrap().clear();
        self.notifications.write().unwrap().clear();
        self.schedules.write().unwrap().clear();
    }

    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.read().unwrap().len()
    }

    /// The most recently started run, for tests and debugging.
    pub fn latest_run(&self) -> Option<ImportRun> {
        self.runs
            .read()
            .unwrap()
            .values()
            .max_by_key(|run| run.started_at)
            .cloned()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_job(&self, job: &JobRecord) -> StoreResult<InsertOutcome> {
        let mut jobs = self.jobs.write().unwrap();
        let key = (job.source, job.external_id.clone());
        if jobs.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        jobs.insert(key, job.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get_job(
        &self,
        source: JobSource,
        external_id: &str,
    ) -> StoreResult<Option<JobRecord>> {
        Ok(self
            .jobs
            .read()
            .unwrap()
            .get(&(source, external_id.to_string()))
            .cloned())
    }

    async fn search_jobs(&self, filters: &JobFilters, limit: usize) -> StoreResult<Vec<JobRecord>> {
        let jobs = self.jobs.read().unwrap();
        let mut matches: Vec<_> = jobs
            .values()
            .filter(|job| filters.matches(job))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn count_jobs(&self) -> StoreResult<usize> {
        Ok(self.jobs.read().unwrap().len())
    }
}

#[async_trait]
impl RunStore for MemoryStore {
    async fn create_run(&self, run: &ImportRun) -> StoreResult<()> {
        self.runs.write().unwrap().insert(run.id, run.clone());
        Ok(())
    }

    async fn record_outcomes(
        &self,
        run_id: Uuid,
        imported: usize,
        skipped: usize,
        failed: usize,
    ) -> StoreResult<()> {
        let mut runs = self.runs.write().unwrap();
        let run = runs
            .get_mut(&run_id)
            .ok_or_else(|| StoreError::Constraint(format!("unknown run {run_id}")))?;
        run.imported += imported;
        run.skipped += skipped;
        run.failed += failed;
        Ok(())
    }

    async fn finalize_run(&self, run_id: Uuid, status: RunStatus) -> StoreResult<()> {
        let mut runs = self.runs.write().unwrap();
        let run = runs
            .get_mut(&run_id)
            .ok_or_else(|| StoreError::Constraint(format!("unknown run {run_id}")))?;
        run.status = status;
        run.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn get_run(&self, run_id: Uuid) -> StoreResult<Option<ImportRun>> {
        Ok(self.runs.read().unwrap().get(&run_id).cloned())
    }
}

#[async_trait]
impl SavedSearchStore for MemoryStore {
    async fn store_saved_search(&self, search: &SavedSearch) -> StoreResult<()> {
        self.saved_searches
            .write()
            .unwrap()
            .insert(search.id, search.clone());
        Ok(())
    }

    async fn saved_searches_to_notify(&self) -> StoreResult<Vec<SavedSearch>> {
        Ok(self
            .saved_searches
            .read()
            .unwrap()
            .values()
            .filter(|s| s.notify_on_new_matches)
            .cloned()
            .collect())
    }

    async fn saved_searches_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<SavedSearch>> {
        Ok(self
            .saved_searches
            .read()
            .unwrap()
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_saved_search(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()> {
        let mut searches = self.saved_searches.write().unwrap();
        if searches.get(&id).is_some_and(|s| s.owner_id == owner_id) {
            searches.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn store_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.notifications
            .write()
            .unwrap()
            .push(notification.clone());
        Ok(())
    }

    async fn notifications_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<Notification>> {
        Ok(self
            .notifications
            .read()
            .unwrap()
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn store_schedule(&self, schedule: &ImportSchedule) -> StoreResult<()> {
        self.schedules
            .write()
            .unwrap()
            .insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn due_schedules(&self, now: DateTime<Utc>) -> StoreResult<Vec<ImportSchedule>> {
        let mut due: Vec<_> = self
            .schedules
            .read()
            .unwrap()
            .values()
            .filter(|s| s.is_due(now))
            .cloned()
            .collect();
        // Never-run schedules first, then stalest
        due.sort_by_key(|s| s.last_run_at);
        Ok(due)
    }

    async fn mark_schedule_run(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(schedule) = self.schedules.write().unwrap().get_mut(&id) {
            schedule.last_run_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::SearchParams;

    fn job(external_id: &str, title: &str) -> JobRecord {
        JobRecord::new(JobSource::Api, external_id, title, "description")
    }

    #[tokio::test]
    async fn test_insert_then_duplicate() {
        let store = MemoryStore::new();

        let first = store.insert_job(&job("e1", "Engineer")).await.unwrap();
        assert_eq!(first, InsertOutcome::Inserted);

        let second = store.insert_job(&job("e1", "Engineer")).await.unwrap();
        assert_eq!(second, InsertOutcome::Duplicate);

        assert_eq!(store.job_count(), 1);
    }

    #[tokio::test]
    async fn test_same_external_id_different_source_both_persist() {
        let store = MemoryStore::new();
        store.insert_job(&job("e1", "Engineer")).await.unwrap();

        let scraped = JobRecord::new(JobSource::Scraped, "e1", "Engineer", "description");
        assert_eq!(
            store.insert_job(&scraped).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(store.job_count(), 2);
    }

    #[tokio::test]
    async fn test_search_newest_first_with_limit() {
        let store = MemoryStore::new();
        let old = job("e1", "Old engineer").with_posted_at(Utc::now() - chrono::Duration::days(5));
        let new = job("e2", "New engineer");
        store.insert_job(&old).await.unwrap();
        store.insert_job(&new).await.unwrap();

        let results = store
            .search_jobs(&JobFilters::new().with_search("engineer"), 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].external_id, "e2");
    }

    #[tokio::test]
    async fn test_run_counters_accumulate() {
        let store = MemoryStore::new();
        let run = ImportRun::new(JobSource::Api, 5);
        store.create_run(&run).await.unwrap();

        store.record_outcomes(run.id, 2, 1, 0).await.unwrap();
        store.record_outcomes(run.id, 1, 0, 1).await.unwrap();
        store.finalize_run(run.id, RunStatus::Completed).await.unwrap();

        let stored = store.get_run(run.id).await.unwrap().unwrap();
        assert_eq!(stored.imported, 3);
        assert_eq!(stored.skipped, 1);
        assert_eq!(stored.failed, 1);
        assert_eq!(stored.status, RunStatus::Completed);
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_saved_search_checks_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let search = SavedSearch::new(owner, "rust jobs", JobFilters::new().with_search("rust"));
        store.store_saved_search(&search).await.unwrap();

        // Wrong owner: no-op
        store
            .delete_saved_search(search.id, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(store.saved_searches_for_owner(owner).await.unwrap().len(), 1);

        store.delete_saved_search(search.id, owner).await.unwrap();
        assert!(store.saved_searches_for_owner(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_due_schedules_orders_never_run_first() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let mut ran = ImportSchedule::new(JobSource::Api, SearchParams::new("a"), 10);
        ran.last_run_at = Some(now - chrono::Duration::minutes(30));
        let fresh = ImportSchedule::new(JobSource::Api, SearchParams::new("b"), 10);

        store.store_schedule(&ran).await.unwrap();
        store.store_schedule(&fresh).await.unwrap();

        let due = store.due_schedules(now).await.unwrap();
        assert_eq!(due.len(), 2);
        assert!(due[0].last_run_at.is_none());
    }
}
