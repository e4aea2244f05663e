//! Scheduled background imports using tokio-cron-scheduler.
//!
//! A single cron job sweeps the schedule table on a fixed cadence. Each due
//! schedule runs its own pipeline invocation; a failing schedule is logged
//! and marked as run so it waits a full interval before the next attempt.
//!
//! ```text
//! Scheduler (every hour by default)
//!     │
//!     └─► due_schedules(now)
//!             └─► for each schedule → run_pipeline(fetcher, query)
//!                     └─► mark_schedule_run
//! ```

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use ingest::{run_pipeline, IngestStore, JobSource, RetryPolicy, SourceFetcher};

/// Maps a schedule's source to the fetcher that serves it.
pub trait FetcherRegistry: Send + Sync {
    fn fetcher_for(&self, source: JobSource) -> Option<Arc<dyn SourceFetcher>>;
}

/// Start the scheduled-import sweep
pub async fn start_scheduler(
    cron: &str,
    store: Arc<dyn IngestStore>,
    fetchers: Arc<dyn FetcherRegistry>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_store = store.clone();
    let sweep_fetchers = fetchers.clone();
    let sweep_job = Job::new_async(cron, move |_uuid, _lock| {
        let store = sweep_store.clone();
        let fetchers = sweep_fetchers.clone();
        Box::pin(async move {
            if let Err(e) = run_due_imports(store, fetchers).await {
                tracing::error!("Scheduled import sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled imports started (cron: {})", cron);
    Ok(scheduler)
}

/// Run every due schedule once
///
/// Queries the schedule table and runs the pipeline for each entry that is
/// enabled and past its interval. Failures are contained per schedule.
pub async fn run_due_imports(
    store: Arc<dyn IngestStore>,
    fetchers: Arc<dyn FetcherRegistry>,
) -> Result<()> {
    let now = Utc::now();
    let due = store.due_schedules(now).await?;

    if due.is_empty() {
        tracing::debug!("No import schedules due");
        return Ok(());
    }

    tracing::info!("Found {} import schedules due", due.len());

    for schedule in due {
        let Some(fetcher) = fetchers.fetcher_for(schedule.source) else {
            tracing::warn!(
                schedule_id = %schedule.id,
                source = %schedule.source,
                "no fetcher configured for scheduled source, skipping"
            );
            continue;
        };

        match run_pipeline(
            fetcher.as_ref(),
            &schedule.query,
            store.as_ref(),
            &RetryPolicy::default(),
        )
        .await
        {
            Ok(summary) => {
                tracing::info!(
                    schedule_id = %schedule.id,
                    source = %schedule.source,
                    imported = summary.imported,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "scheduled import finished"
                );
            }
            Err(e) => {
                tracing::error!(
                    schedule_id = %schedule.id,
                    source = %schedule.source,
                    error = %e,
                    "scheduled import failed"
                );
            }
        }

        // Marked regardless of outcome, so a broken source does not spin
        if let Err(e) = store.mark_schedule_run(schedule.id, now).await {
            tracing::error!(schedule_id = %schedule.id, error = %e, "failed to mark schedule run");
        }
    }

    Ok(())
}
