//! Zero-result trigger: when an interactive search finds nothing locally,
//! kick off one import for that query in the background.
//!
//! The trigger never blocks or retries the original search. Repeated
//! searches for the same term within the debounce window are ignored, as is
//! a term whose import is still in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::pipeline::import::run_pipeline;
use crate::retry::RetryPolicy;
use crate::traits::fetcher::SourceFetcher;
use crate::traits::store::IngestStore;
use crate::types::{
    job::SearchParams,
    notification::{Notification, NotificationKind},
};
use uuid::Uuid;

/// Default debounce window, enough to absorb rapid repeated searches
/// while someone refines a query.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(30);

/// Where a term's background import ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Triggered,
    Succeeded,
    NoNewJobs,
    Failed,
}

/// What `maybe_trigger` decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A background import was started for this term
    Triggered,
    /// The term was triggered recently; nothing started
    Debounced,
    /// An import for this term is still in flight
    AlreadyRunning,
}

struct TermEntry {
    state: TriggerState,
    last_triggered: Instant,
}

/// Per-term trigger bookkeeping, shared across search handlers.
#[derive(Clone)]
pub struct ZeroResultTrigger {
    window: Duration,
    /// Recipient for "new jobs available" notifications, when configured
    recipient: Option<Uuid>,
    terms: Arc<Mutex<HashMap<String, TermEntry>>>,
}

impl Default for ZeroResultTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl ZeroResultTrigger {
    pub fn new() -> Self {
        Self {
            window: DEFAULT_DEBOUNCE_WINDOW,
            recipient: None,
            terms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_recipient(mut self, recipient: Uuid) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Current state for a term (normalized), for tests and UI polling.
    pub fn state(&self, term: &str) -> TriggerState {
        self.terms
            .lock()
            .unwrap()
            .get(&term.trim().to_lowercase())
            .map(|e| e.state)
            .unwrap_or(TriggerState::Idle)
    }

    /// Start a background import for `query` unless one ran recently or is
    /// still running. Returns immediately; the spawned task updates the
    /// term's state when it finishes.
    pub fn maybe_trigger(
        &self,
        query: &SearchParams,
        fetcher: Arc<dyn SourceFetcher>,
        store: Arc<dyn IngestStore>,
        policy: RetryPolicy,
    ) -> TriggerOutcome {
        let term = query.term();
        {
            let mut terms = self.terms.lock().unwrap();
            if let Some(entry) = terms.get(&term) {
                if entry.state == TriggerState::Triggered {
                    return TriggerOutcome::AlreadyRunning;
                }
                if entry.last_triggered.elapsed() < self.window {
                    return TriggerOutcome::Debounced;
                }
            }
            terms.insert(
                term.clone(),
                TermEntry {
                    state: TriggerState::Triggered,
                    last_triggered: Instant::now(),
                },
            );
        }

        info!(term = %term, fetcher = fetcher.name(), "zero-result import triggered");

        let terms = Arc::clone(&self.terms);
        let query = query.clone();
        let recipient = self.recipient;

        tokio::spawn(async move {
            let final_state =
                match run_pipeline(fetcher.as_ref(), &query, store.as_ref(), &policy).await {
                    Ok(summary) if summary.imported > 0 => {
                        if let Some(recipient) = recipient {
                            let notification = Notification::new(
                                recipient,
                                NotificationKind::NewJobsAvailable {
                                    search_term: query.term(),
                                    count: summary.imported,
                                },
                            );
                            if let Err(e) = store.store_notification(&notification).await {
                                warn!(error = %e, "failed to store new-jobs notification");
                            }
                        }
                        TriggerState::Succeeded
                    }
                    Ok(_) => TriggerState::NoNewJobs,
                    Err(e) => {
                        warn!(term = %query.term(), error = %e, "triggered import failed");
                        TriggerState::Failed
                    }
                };

            if let Some(entry) = terms.lock().unwrap().get_mut(&query.term()) {
                entry.state = final_state;
            }
        });

        TriggerOutcome::Triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::MockFetcher;
    use crate::traits::store::{JobStore, NotificationStore};
    use crate::types::job::RawJob;

    fn quick() -> RetryPolicy {
        RetryPolicy::new(1, Duration::from_millis(1))
    }

    async fn wait_for_settle(trigger: &ZeroResultTrigger, term: &str) -> TriggerState {
        for _ in 0..200 {
            let state = trigger.state(term);
            if state != TriggerState::Triggered {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        trigger.state(term)
    }

    #[tokio::test]
    async fn test_trigger_imports_and_notifies() {
        let store = Arc::new(MemoryStore::new());
        let recipient = Uuid::new_v4();
        let trigger = ZeroResultTrigger::new().with_recipient(recipient);
        let fetcher = Arc::new(
            MockFetcher::new().with_job(RawJob::new("Rust dev", "desc").with_id("r1")),
        );

        let outcome = trigger.maybe_trigger(
            &SearchParams::new("rust"),
            fetcher,
            store.clone(),
            quick(),
        );
        assert_eq!(outcome, TriggerOutcome::Triggered);

        assert_eq!(wait_for_settle(&trigger, "rust").await, TriggerState::Succeeded);
        assert_eq!(store.count_jobs().await.unwrap(), 1);
        let notifications = store.notifications_for_recipient(recipient).await.unwrap();
        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_no_new_jobs_state() {
        let store = Arc::new(MemoryStore::new());
        let trigger = ZeroResultTrigger::new();
        let fetcher = Arc::new(MockFetcher::new()); // zero results

        trigger.maybe_trigger(&SearchParams::new("cobol"), fetcher, store, quick());
        assert_eq!(
            wait_for_settle(&trigger, "cobol").await,
            TriggerState::NoNewJobs
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_contained() {
        let store = Arc::new(MemoryStore::new());
        let trigger = ZeroResultTrigger::new();
        let fetcher = Arc::new(MockFetcher::new().failing());

        trigger.maybe_trigger(&SearchParams::new("rust"), fetcher, store.clone(), quick());
        assert_eq!(wait_for_settle(&trigger, "rust").await, TriggerState::Failed);
        assert_eq!(store.count_jobs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_debounce_within_window() {
        let store = Arc::new(MemoryStore::new());
        let trigger = ZeroResultTrigger::new().with_window(Duration::from_secs(60));
        let fetcher = Arc::new(MockFetcher::new());

        let first = trigger.maybe_trigger(
            &SearchParams::new("rust"),
            fetcher.clone(),
            store.clone(),
            quick(),
        );
        assert_eq!(first, TriggerOutcome::Triggered);

        wait_for_settle(&trigger, "rust").await;

        // Same term again inside the window: debounced, exactly one import
        let second = trigger.maybe_trigger(&SearchParams::new("RUST "), fetcher, store, quick());
        assert_eq!(second, TriggerOutcome::Debounced);
    }

    #[tokio::test]
    async fn test_distinct_terms_trigger_independently() {
        let store = Arc::new(MemoryStore::new());
        let trigger = ZeroResultTrigger::new();
        let fetcher = Arc::new(MockFetcher::new());

        let a = trigger.maybe_trigger(
            &SearchParams::new("rust"),
            fetcher.clone(),
            store.clone(),
            quick(),
        );
        let b = trigger.maybe_trigger(&SearchParams::new("go"), fetcher, store, quick());
        assert_eq!(a, TriggerOutcome::Triggered);
        assert_eq!(b, TriggerOutcome::Triggered);
    }
}
