//! Fetcher for uploaded CSV buffers.
//!
//! No network involved, so the only failure mode is a malformed buffer.
//! Individual rows that fail to deserialize are skipped with a warning;
//! the normalizer re-checks mandatory fields afterwards.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FetchResult;
use crate::traits::fetcher::SourceFetcher;
use crate::types::job::{JobSource, RawJob, SearchParams};

/// One row of an uploaded CSV, keyed by header.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "type")]
    employment_type: Option<String>,
    #[serde(default)]
    salary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    posted_at: Option<String>,
}

impl From<CsvRow> for RawJob {
    fn from(row: CsvRow) -> Self {
        RawJob {
            id: None,
            title: row.title,
            company_name: row.company,
            location: row.location,
            employment_type: row.employment_type,
            salary_text: row.salary,
            description: row.description,
            category: row.category,
            posted_at: row.posted_at,
            url: None,
        }
    }
}

/// Parses an in-memory CSV upload into raw records.
pub struct CsvFetcher {
    data: Vec<u8>,
}

impl CsvFetcher {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

#[async_trait]
impl SourceFetcher for CsvFetcher {
    async fn fetch(&self, _query: &SearchParams) -> FetchResult<Vec<RawJob>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(self.data.as_slice());

        let mut jobs = Vec::new();
        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            match row {
                Ok(row) => jobs.push(RawJob::from(row)),
                Err(e) => {
                    warn!(row = index + 1, error = %e, "skipping malformed CSV row");
                }
            }
        }

        debug!(rows = jobs.len(), "CSV parsed");
        Ok(jobs)
    }

    fn source(&self) -> JobSource {
        JobSource::Csv
    }
}
