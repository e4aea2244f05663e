//! Saved-search matching for newly imported jobs.

use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::store::{NotificationStore, SavedSearchStore};
use crate::types::{
    job::JobRecord,
    notification::{Notification, NotificationKind},
};

/// Store a `SavedSearchMatch` notification for every (subscribed search,
/// matching new job) pair. Individual store failures are logged and
/// skipped; the pass keeps going.
pub async fn notify_saved_searches<S>(store: &S, new_jobs: &[&JobRecord]) -> Result<usize>
where
    S: SavedSearchStore + NotificationStore + ?Sized,
{
    if new_jobs.is_empty() {
        return Ok(0);
    }

    let searches = store.saved_searches_to_notify().await?;
    let mut created = 0;

    for search in &searches {
        for job in new_jobs {
            if !search.filters.matches(job) {
                continue;
            }

            let notification = Notification::new(
                search.owner_id,
                NotificationKind::SavedSearchMatch {
                    saved_search_id: search.id,
                    job_id: job.id,
                    job_title: job.title.clone(),
                },
            );

            match store.store_notification(&notification).await {
                Ok(()) => created += 1,
                Err(e) => {
                    warn!(
                        saved_search = %search.id,
                        job = %job.id,
                        error = %e,
                        "failed to store match notification"
                    );
                }
            }
        }
    }

    debug!(
        searches = searches.len(),
        jobs = new_jobs.len(),
        created,
        "saved-search matching complete"
    );

    Ok(created)
}
