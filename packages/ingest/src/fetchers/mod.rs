//! Source fetcher implementations.
//!
//! - [`ApiFetcher`] - third-party jobs API over HTTPS with bearer auth
//! - [`BridgeFetcher`] - external scraping toolchain run as a subprocess
//! - [`CsvFetcher`] - uploaded CSV buffers, no network involved

pub mod api;
pub mod bridge;
pub mod csv;

pub use api::ApiFetcher;
pub use bridge::BridgeFetcher;
pub use csv::CsvFetcher;
