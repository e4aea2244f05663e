//! Normalizer: maps source-shaped raw records into canonical `JobRecord`s.
//!
//! Pure and deterministic, so a batch can be re-normalized on retry without
//! re-fetching. Records missing mandatory fields are rejected; everything
//! else degrades gracefully (unparsable dates fall back to "now").

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::types::job::{JobRecord, JobSource, RawJob};

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|an?)\s+(minute|hour|day|week|month)s?\s+ago$").unwrap()
});

/// Why a raw record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingTitle,
    MissingDescription,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MissingTitle => f.write_str("missing title"),
            Rejection::MissingDescription => f.write_str("missing description"),
        }
    }
}

/// A normalized batch plus the count of rejected raw records.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<JobRecord>,
    pub rejected: usize,
}

/// Normalize one raw record, or reject it if title or description is
/// missing or blank.
pub fn normalize(raw: &RawJob, source: JobSource) -> Result<JobRecord, Rejection> {
    normalize_at(raw, source, Utc::now())
}

/// Normalize with an explicit "now", so date fallbacks are testable.
pub fn normalize_at(
    raw: &RawJob,
    source: JobSource,
    now: DateTime<Utc>,
) -> Result<JobRecord, Rejection> {
    let title = non_blank(raw.title.as_deref()).ok_or(Rejection::MissingTitle)?;
    let description = non_blank(raw.description.as_deref()).ok_or(Rejection::MissingDescription)?;

    let external_id = match non_blank(raw.id.as_deref()) {
        Some(id) => id.to_string(),
        None => JobRecord::synthesize_external_id(
            title,
            raw.company_name.as_deref(),
            raw.location.as_deref(),
        ),
    };

    let posted_at = raw
        .posted_at
        .as_deref()
        .and_then(|s| parse_posted_at(s, now))
        .unwrap_or(now);

    let mut record = JobRecord::new(source, external_id, title, description);
    record.company_name = raw.company_name.clone().filter(|s| !s.trim().is_empty());
    record.location = raw.location.clone().filter(|s| !s.trim().is_empty());
    record.employment_type = raw.employment_type.clone().filter(|s| !s.trim().is_empty());
    record.salary_text = raw.salary_text.clone().filter(|s| !s.trim().is_empty());
    record.category = raw.category.clone().filter(|s| !s.trim().is_empty());
    record.url = raw.url.clone().filter(|s| !s.trim().is_empty());
    record.posted_at = posted_at;

    Ok(record)
}

/// Normalize a whole batch, counting rejections instead of failing.
pub fn normalize_batch(raws: &[RawJob], source: JobSource) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for raw in raws {
        match normalize(raw, source) {
            Ok(record) => batch.records.push(record),
            Err(rejection) => {
                debug!(source = %source, reason = %rejection, "rejected raw record");
                batch.rejected += 1;
            }
        }
    }
    batch
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a source-reported posting date in any of the formats sources use:
/// RFC 3339, bare dates, and relative strings like "2 days ago". Returns
/// None for anything unparsable; the caller falls back to `now`.
pub fn parse_posted_at(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    parse_relative(&s.to_lowercase(), now)
}

/// "2 days ago", "an hour ago", "yesterday", "just now".
fn parse_relative(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match s {
        "just now" | "now" | "today" => return Some(now),
        "yesterday" => return Some(now - Duration::days(1)),
        _ => {}
    }

    let captures = RELATIVE_DATE.captures(s)?;

    let count: i64 = match &captures[1] {
        "a" | "an" => 1,
        digits => digits.parse().ok()?,
    };

    let delta = match &captures[2] {
        "minute" => Duration::minutes(count),
        "hour" => Duration::hours(count),
        "day" => Duration::days(count),
        "week" => Duration::weeks(count),
        // Close enough for display ordering
        "month" => Duration::days(count * 30),
        _ => return None,
    };

    Some(now - delta)
}
