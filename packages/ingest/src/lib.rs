//! Job Ingestion & Deduplication Pipeline
//!
//! Pulls job postings from heterogeneous sources (partner APIs, a scraping
//! subprocess bridge, CSV uploads), normalizes them into a canonical record,
//! and imports them idempotently: re-running any import never creates
//! duplicates and never loses data.
//!
//! # Design Philosophy
//!
//! **"Sources lie; the importer doesn't"**
//!
//! - Every source produces the same [`RawJob`] shape, however messy
//! - Normalization is pure and total: bad input rejects a record, never a batch
//! - The (source, external_id) key is the single dedup authority
//! - Transient storage failures retry; permanent ones fail one record
//! - An import run always finishes with an accounted-for outcome per record
//!
//! # Usage
//!
//! ```rust,ignore
//! use ingest::{run_pipeline, ApiFetcher, MemoryStore, RetryPolicy, SearchParams};
//!
//! let fetcher = ApiFetcher::new("https://partner.example.com", "token");
//! let store = MemoryStore::new();
//! let query = SearchParams::new("rust engineer");
//!
//! let summary = run_pipeline(&fetcher, &query, &store, &RetryPolicy::default()).await?;
//! println!("imported {}, skipped {}", summary.imported, summary.skipped);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (SourceFetcher, store traits)
//! - [`types`] - Canonical data types (RawJob, JobRecord, ImportRun, ...)
//! - [`normalize`] - Pure raw-to-canonical conversion with date parsing
//! - [`pipeline`] - Import orchestration, retries, notifications, search
//! - [`fetchers`] - Source implementations (ApiFetcher, BridgeFetcher, CsvFetcher)
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fallback;
pub mod fetchers;
pub mod normalize;
pub mod pipeline;
pub mod retry;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, IngestError, Result, StoreError};
pub use traits::{
    fetcher::SourceFetcher,
    store::{
        IngestStore, InsertOutcome, JobStore, NotificationStore, RunStore, SavedSearchStore,
        ScheduleStore,
    },
};
pub use types::{
    job::{JobRecord, JobSource, RawJob, SearchParams},
    notification::{Notification, NotificationKind},
    run::{ImportRun, ImportSummary, RunStatus},
    saved_search::{JobFilters, SavedSearch},
    schedule::ImportSchedule,
};

// Re-export pipeline components
pub use pipeline::{
    import_batch, notify_saved_searches, refresh_and_search, run_pipeline,
    run_pipeline_notifying, search_with_fallback, ResultOrigin, SearchOutcome, TriggerOutcome,
    TriggerState, ZeroResultTrigger, DEFAULT_DEBOUNCE_WINDOW,
};

pub use normalize::{normalize, normalize_batch, NormalizedBatch, Rejection};
pub use retry::RetryPolicy;

// Re-export fetchers
pub use fetchers::{ApiFetcher, BridgeFetcher, CsvFetcher};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

pub use fallback::demo_jobs;

// Re-export testing utilities
pub use testing::{FlakyStore, MockFetcher};
