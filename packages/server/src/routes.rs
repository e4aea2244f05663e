//! HTTP surface for the ingestion pipeline.
//!
//! Thin handlers over the `ingest` crate: deserialize, delegate, map errors
//! to a JSON envelope. The `retryable` flag tells callers whether the same
//! request is worth repeating.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use ingest::{
    import_batch, normalize_batch, run_pipeline_notifying, search_with_fallback, FetchError,
    ImportRun,
    IngestError, IngestStore, JobFilters, JobRecord, JobSource, RawJob, RetryPolicy, SearchParams,
    SourceFetcher, ZeroResultTrigger,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IngestStore>,
    pub api_fetcher: Arc<dyn SourceFetcher>,
    pub policy: RetryPolicy,
    pub trigger: ZeroResultTrigger,
    /// Recipient for import-completed notifications, when configured
    pub admin_recipient: Option<Uuid>,
}

impl AppState {
    pub fn new(store: Arc<dyn IngestStore>, api_fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            store,
            api_fetcher,
            policy: RetryPolicy::default(),
            trigger: ZeroResultTrigger::new(),
            admin_recipient: None,
        }
    }

    pub fn with_admin_recipient(mut self, recipient: Uuid) -> Self {
        self.admin_recipient = Some(recipient);
        self
    }
}

/// Build the application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/imports", post(create_import_handler))
        .route("/api/imports/refresh", post(refresh_handler))
        .route("/api/imports/:id", get(get_import_handler))
        .route("/api/jobs/search", get(search_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON error envelope shared by all handlers.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    pub retryable: bool,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    fn bad_request(error: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            error: error.into(),
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            retryable: false,
            status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn not_found(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            retryable: false,
            status: StatusCode::NOT_FOUND,
        }
    }

    fn from_ingest(err: IngestError) -> Self {
        let (status, retryable) = match &err {
            IngestError::Fetch(FetchError::Auth) => (StatusCode::BAD_GATEWAY, false),
            IngestError::Fetch(_) => (StatusCode::BAD_GATEWAY, true),
            IngestError::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, e.is_transient()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, false),
        };
        Self {
            error: err.to_string(),
            details: None,
            retryable,
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    jobs: usize,
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match state.store.count_jobs().await {
        Ok(jobs) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                jobs,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: format!("store unavailable: {}", e),
                jobs: 0,
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub jobs: Vec<RawJob>,
    /// Client-supplied run id, for tracing an upload end to end
    #[serde(default)]
    pub import_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub job_ids: Vec<Uuid>,
}

/// Direct upload of job records (manual entry, partner pushes).
async fn create_import_handler(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    if request.jobs.is_empty() {
        return Err(ApiError::bad_request("no jobs provided", vec![]));
    }

    let mut details = Vec::new();
    for (index, job) in request.jobs.iter().enumerate() {
        if job.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            details.push(format!("job {}: title is required", index + 1));
        }
        if job
            .description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
        {
            details.push(format!("job {}: description is required", index + 1));
        }
        if job
            .company_name
            .as_deref()
            .map_or(true, |c| c.trim().is_empty())
        {
            details.push(format!("job {}: company is required", index + 1));
        }
    }
    if !details.is_empty() {
        return Err(ApiError::bad_request("validation failed", details));
    }

    let batch = normalize_batch(&request.jobs, JobSource::Manual);

    let mut run = ImportRun::new(JobSource::Manual, request.jobs.len());
    if let Some(id) = request.import_id {
        run = run.with_id(id);
    }
    let run_id = run.id;
    state
        .store
        .create_run(&run)
        .await
        .map_err(|e| ApiError::from_ingest(IngestError::Store(e)))?;

    let summary = import_batch(&batch.records, run_id, state.store.as_ref(), &state.policy)
        .await
        .map_err(ApiError::from_ingest)?;

    info!(
        run_id = %run_id,
        imported = summary.imported,
        skipped = summary.skipped,
        failed = summary.failed,
        "manual import finished"
    );

    Ok(Json(ImportResponse {
        success: true,
        message: format!(
            "imported {}, skipped {}, failed {}",
            summary.imported,
            summary.skipped,
            summary.failed + batch.rejected
        ),
        job_ids: summary.job_ids,
    }))
}

/// Pull a fresh batch from the partner API.
async fn refresh_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ImportResponse>, ApiError> {
    let params = query.to_params();
    let summary = run_pipeline_notifying(
        state.api_fetcher.as_ref(),
        &params,
        state.store.as_ref(),
        &state.policy,
        state.admin_recipient,
    )
    .await
    .map_err(ApiError::from_ingest)?;

    Ok(Json(ImportResponse {
        success: true,
        message: format!(
            "imported {}, skipped {}, failed {}",
            summary.imported, summary.skipped, summary.failed
        ),
        job_ids: summary.job_ids,
    }))
}

async fn get_import_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImportRun>, ApiError> {
    let run = state
        .store
        .get_run(id)
        .await
        .map_err(|e| ApiError::from_ingest(IngestError::Store(e)))?;

    run.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("import run {} not found", id)))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    fn to_params(&self) -> SearchParams {
        let mut params = SearchParams::default();
        params.search = self.search.clone();
        params.location = self.location.clone();
        params.remote = self.remote;
        params
    }

    fn to_filters(&self) -> JobFilters {
        let mut filters = JobFilters::new();
        filters.search = self.search.clone();
        filters.location = self.location.clone();
        filters
    }
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub jobs: Vec<JobRecord>,
    pub origin: String,
    pub degraded: bool,
    /// Whether this search kicked off a background import
    pub triggered: bool,
}

/// Job search with fallback and the zero-result background import.
async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let limit = query.limit.unwrap_or(50).min(200);
    let outcome = search_with_fallback(state.store.as_ref(), &query.to_filters(), limit).await;

    // A genuine miss against a populated store is worth a background import
    let mut triggered = false;
    if outcome.jobs.is_empty() {
        let params = query.to_params();
        if !params.term().is_empty() {
            let decision = state.trigger.maybe_trigger(
                &params,
                Arc::clone(&state.api_fetcher),
                Arc::clone(&state.store),
                state.policy.clone(),
            );
            triggered = decision == ingest::TriggerOutcome::Triggered;
            if triggered {
                warn!(term = %params.term(), "no local results, background import started");
            }
        }
    }

    Json(SearchResponse {
        jobs: outcome.jobs,
        origin: match outcome.origin {
            ingest::ResultOrigin::Store => "store".to_string(),
            ingest::ResultOrigin::Fallback => "fallback".to_string(),
        },
        degraded: outcome.upstream_degraded,
        triggered,
    })
}
