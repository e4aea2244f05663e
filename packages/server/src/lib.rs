// Hirely ingestion server
//
// Thin HTTP and scheduling shell over the `ingest` crate: configuration,
// an axum API surface, and cron-driven background imports.

pub mod config;
pub mod routes;
pub mod schedule;

pub use config::*;
pub use routes::{build_app, AppState};
pub use schedule::{start_scheduler, FetcherRegistry};
