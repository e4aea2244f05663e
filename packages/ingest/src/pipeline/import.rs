//! Importer: validate, deduplicate, persist, and track an import run.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{IngestError, Result, StoreError};
use crate::normalize::normalize_batch;
use crate::retry::RetryPolicy;
use crate::traits::fetcher::SourceFetcher;
use crate::traits::store::{IngestStore, InsertOutcome};
use crate::types::{
    job::{JobRecord, SearchParams},
    notification::{Notification, NotificationKind},
    run::{ImportRun, ImportSummary, RunStatus},
};

use super::notify::notify_saved_searches;

/// Update the run counters for one processed record.
///
/// Counter updates never abort the batch: the job rows are the source of
/// truth, the counters are bookkeeping. Transient failures are retried,
/// anything left over is logged and dropped.
async fn record_outcome<S>(
    store: &S,
    run_id: Uuid,
    policy: &RetryPolicy,
    imported: usize,
    skipped: usize,
    failed: usize,
) where
    S: IngestStore + ?Sized,
{
    let result = policy
        .retry(
            StoreError::is_transient,
            |attempt, err: &StoreError| {
                warn!(%run_id, attempt, error = %err, "transient counter update, retrying");
            },
            || store.record_outcomes(run_id, imported, skipped, failed),
        )
        .await;
    if let Err(err) = result {
        warn!(%run_id, error = %err, "run counters not updated for one record");
    }
}

/// Import a batch of canonical records against an existing `Running` run.
///
/// Records are processed sequentially in array order. Per record:
/// - schema validation failure counts as `failed` and the batch continues
/// - a dedup hit (pre-check or a raced unique violation) counts as `skipped`
/// - transient storage errors are retried per `policy`; exhaustion counts
///   as `failed`
/// - non-transient errors count as `failed` immediately
///
/// The run is finalized `Completed` once every record has been processed,
/// even when some failed. There is no batch atomicity and no rollback.
pub async fn import_batch<S>(
    records: &[JobRecord],
    run_id: Uuid,
    store: &S,
    policy: &RetryPolicy,
) -> Result<ImportSummary>
where
    S: IngestStore + ?Sized,
{
    let mut summary = ImportSummary::default();

    for record in records {
        if let Err(reason) = record.validate() {
            warn!(
                source = %record.source,
                external_id = %record.external_id,
                %reason,
                "record failed validation"
            );
            summary.failed += 1;
            record_outcome(store, run_id, policy, 0, 0, 1).await;
            continue;
        }

        let outcome = policy
            .retry(
                StoreError::is_transient,
                |attempt, err: &StoreError| {
                    warn!(
                        external_id = %record.external_id,
                        attempt,
                        error = %err,
                        "transient insert failure, retrying"
                    );
                },
                || store.insert_job(record),
            )
            .await;

        match outcome {
            Ok(InsertOutcome::Inserted) => {
                summary.imported += 1;
                summary.job_ids.push(record.id);
                record_outcome(store, run_id, policy, 1, 0, 0).await;
            }
            Ok(InsertOutcome::Duplicate) | Err(StoreError::Duplicate { .. }) => {
                summary.skipped += 1;
                record_outcome(store, run_id, policy, 0, 1, 0).await;
            }
            Err(err) => {
                warn!(
                    external_id = %record.external_id,
                    error = %err,
                    "record failed to persist"
                );
                summary.failed += 1;
                record_outcome(store, run_id, policy, 0, 0, 1).await;
            }
        }
    }

    policy
        .retry(
            StoreError::is_transient,
            |attempt, err: &StoreError| {
                warn!(%run_id, attempt, error = %err, "transient finalize failure, retrying");
            },
            || store.finalize_run(run_id, RunStatus::Completed),
        )
        .await?;

    info!(
        %run_id,
        imported = summary.imported,
        skipped = summary.skipped,
        failed = summary.failed,
        "import batch complete"
    );

    Ok(summary)
}

/// Run the full pipeline for one source: fetch, normalize, import.
///
/// Creates and owns the `ImportRun`. Fetch errors propagate to the caller,
/// which decides how to degrade (the interactive search path falls back to
/// cached data). A store that is unreachable before the run row exists
/// surfaces as `RunNotStarted`; nothing was attempted in that case.
pub async fn run_pipeline<F, S>(
    fetcher: &F,
    query: &SearchParams,
    store: &S,
    policy: &RetryPolicy,
) -> Result<ImportSummary>
where
    F: SourceFetcher + ?Sized,
    S: IngestStore + ?Sized,
{
    run_pipeline_notifying(fetcher, query, store, policy, None).await
}

/// Like [`run_pipeline`], but also stores an `ImportCompleted` notification
/// for `admin` once the run is finalized, carrying the run's counters.
/// Notification failures are logged, never escalated.
pub async fn run_pipeline_notifying<F, S>(
    fetcher: &F,
    query: &SearchParams,
    store: &S,
    policy: &RetryPolicy,
    admin: Option<Uuid>,
) -> Result<ImportSummary>
where
    F: SourceFetcher + ?Sized,
    S: IngestStore + ?Sized,
{
    let source = fetcher.source();
    info!(fetcher = fetcher.name(), %source, search = ?query.search, "pipeline starting");

    let raws = fetcher.fetch(query).await?;
    let batch = normalize_batch(&raws, source);

    let run = ImportRun::new(source, raws.len());
    let run_id = run.id;
    store
        .create_run(&run)
        .await
        .map_err(|e| IngestError::RunNotStarted(e.to_string()))?;

    // Normalizer rejections count toward the run's failures
    if batch.rejected > 0 {
        record_outcome(store, run_id, policy, 0, 0, batch.rejected).await;
    }

    let mut summary = import_batch(&batch.records, run_id, store, policy).await?;
    summary.failed += batch.rejected;

    // Match newly imported jobs against notification subscriptions;
    // failures here are logged, never escalated.
    let inserted: Vec<&JobRecord> = batch
        .records
        .iter()
        .filter(|r| summary.job_ids.contains(&r.id))
        .collect();
    if let Err(e) = notify_saved_searches(store, &inserted).await {
        warn!(%run_id, error = %e, "saved-search notification pass failed");
    }

    if let Some(admin) = admin {
        let notification = Notification::new(
            admin,
            NotificationKind::ImportCompleted {
                run_id,
                imported: summary.imported,
                skipped: summary.skipped,
                failed: summary.failed,
            },
        );
        if let Err(e) = store.store_notification(&notification).await {
            warn!(%run_id, error = %e, "failed to store import-completed notification");
        }
    }

    info!(
        %run_id,
        requested = raws.len(),
        imported = summary.imported,
        skipped = summary.skipped,
        failed = summary.failed,
        "pipeline complete"
    );

    Ok(summary)
}
