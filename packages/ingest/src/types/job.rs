//! Canonical job types: raw source records, normalized records, and search
//! parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Provenance tag for a job record. Immutable once the record is created;
/// combined with the external id it forms the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    Api,
    Scraped,
    Csv,
    Manual,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Api => "api",
            JobSource::Scraped => "scraped",
            JobSource::Csv => "csv",
            JobSource::Manual => "manual",
        }
    }

    /// Parse a stored provenance tag. Unknown tags map to `Manual` rather
    /// than failing a read path.
    pub fn parse(s: &str) -> Self {
        match s {
            "api" => JobSource::Api,
            "scraped" => JobSource::Scraped,
            "csv" => JobSource::Csv,
            _ => JobSource::Manual,
        }
    }
}

impl std::fmt::Display for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting as returned by a source fetcher, before normalization.
///
/// Every field is optional because each source reports a different subset;
/// the normalizer decides what is mandatory. Serde aliases absorb the common
/// field-name variations across sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJob {
    /// Source-assigned identifier, if the source provides one
    #[serde(default, alias = "external_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, alias = "company")]
    pub company_name: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default, alias = "type", alias = "job_type")]
    pub employment_type: Option<String>,

    #[serde(default, alias = "salary")]
    pub salary_text: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    /// Posting date in whatever format the source uses (ISO, "2 days ago")
    #[serde(default, alias = "date_posted", alias = "created_at")]
    pub posted_at: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

impl RawJob {
    /// Create a raw job with the two fields every source reports.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_posted_at(mut self, posted_at: impl Into<String>) -> Self {
        self.posted_at = Some(posted_at.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Canonical, deduplicated representation of one job posting.
///
/// Invariant: the pair (`source`, `external_id`) is unique across storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,

    /// Source-assigned identifier; synthesized for CSV/manual records
    pub external_id: String,

    pub source: JobSource,

    pub title: String,
    pub description: String,

    pub company_name: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_text: Option<String>,
    pub category: Option<String>,

    /// Source-reported posting date; ingestion time if the source had none
    pub posted_at: DateTime<Utc>,

    /// Link to the original posting (absent for CSV/manual)
    pub url: Option<String>,
}

impl JobRecord {
    /// Create a record with required fields; the rest default to empty.
    pub fn new(
        source: JobSource,
        external_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id: external_id.into(),
            source,
            title: title.into(),
            description: description.into(),
            company_name: None,
            location: None,
            employment_type: None,
            salary_text: None,
            category: None,
            posted_at: Utc::now(),
            url: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_posted_at(mut self, posted_at: DateTime<Utc>) -> Self {
        self.posted_at = posted_at;
        self
    }

    /// The dedup key for this record.
    pub fn dedup_key(&self) -> (JobSource, &str) {
        (self.source, &self.external_id)
    }

    /// Synthesize a stable external id from identifying fields.
    ///
    /// CSV and manual records carry no source-assigned id, so re-importing
    /// the same row must produce the same key for idempotency. Fields are
    /// trimmed and lowercased so cosmetic edits don't create duplicates.
    pub fn synthesize_external_id(
        title: &str,
        company_name: Option<&str>,
        location: Option<&str>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(title.trim().to_lowercase().as_bytes());
        hasher.update(b"|");
        hasher.update(company_name.unwrap_or("").trim().to_lowercase().as_bytes());
        hasher.update(b"|");
        hasher.update(location.unwrap_or("").trim().to_lowercase().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Validate the fields the importer requires.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        if self.external_id.trim().is_empty() {
            return Err("external_id is required".to_string());
        }
        Ok(())
    }
}

/// Query parameters accepted by every source fetcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub remote: Option<bool>,

    #[serde(default)]
    pub page: Option<u32>,

    /// Additional filters passed through to the source untouched
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// The search term used for trigger debouncing, normalized for lookup.
    pub fn term(&self) -> String {
        self.search
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_id_is_stable() {
        let a = JobRecord::synthesize_external_id("Engineer", Some("Acme"), Some("Oslo"));
        let b = JobRecord::synthesize_external_id("  engineer ", Some("ACME"), Some("oslo"));
        assert_eq!(a, b);

        let c = JobRecord::synthesize_external_id("Engineer", Some("Other"), Some("Oslo"));
        assert_ne!(a, c);
    }

    #[test]
    fn test_validate_requires_title_and_description() {
        let ok = JobRecord::new(JobSource::Csv, "x1", "Engineer", "Builds things");
        assert!(ok.validate().is_ok());

        let no_title = JobRecord::new(JobSource::Csv, "x2", "   ", "Builds things");
        assert!(no_title.validate().is_err());

        let no_desc = JobRecord::new(JobSource::Csv, "x3", "Engineer", "");
        assert!(no_desc.validate().is_err());
    }

    #[test]
    fn test_raw_job_aliases() {
        let raw: RawJob = serde_json::from_str(
            r#"{"title": "Dev", "company": "Acme", "type": "full_time", "date_posted": "2024-05-01"}"#,
        )
        .unwrap();

        assert_eq!(raw.company_name.as_deref(), Some("Acme"));
        assert_eq!(raw.employment_type.as_deref(), Some("full_time"));
        assert_eq!(raw.posted_at.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_source_round_trip() {
        for source in [
            JobSource::Api,
            JobSource::Scraped,
            JobSource::Csv,
            JobSource::Manual,
        ] {
            assert_eq!(JobSource::parse(source.as_str()), source);
        }
        assert_eq!(JobSource::parse("unknown"), JobSource::Manual);
    }
}
