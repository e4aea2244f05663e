//! Pipeline orchestration: fetch, normalize, import, and the companions
//! around it (zero-result trigger, search fallback, saved-search matching).

pub mod import;
pub mod notify;
pub mod search;
pub mod trigger;

pub use import::{import_batch, run_pipeline, run_pipeline_notifying};
pub use notify::notify_saved_searches;
pub use search::{refresh_and_search, search_with_fallback, ResultOrigin, SearchOutcome};
pub use trigger::{TriggerOutcome, TriggerState, ZeroResultTrigger, DEFAULT_DEBOUNCE_WINDOW};
