//! Job Board API Server
//!
//! Simulated backend for the job board: serves filtered, paginated job
//! listings and job details from a JSON corpus and accepts applications.
//! Every endpoint waits for a configurable delay to mimic network latency.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{Application, ApplicationReceipt, FieldError, Job, JobsRequest, QueryError, QueryResult};
use serde::Serialize;
use thiserror::Error;

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// JSON array of jobs served by the API
    pub data_path: PathBuf,
    pub list_delay: Duration,
    pub detail_delay: Duration,
    pub submit_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_path: PathBuf::from("data/jobs.json"),
            list_delay: Duration::from_millis(100),
            detail_delay: Duration::from_millis(200),
            submit_delay: Duration::from_millis(1000),
        }
    }
}

impl ServerConfig {
    /// Same delay for every endpoint.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self.detail_delay = delay;
        self.submit_delay = delay;
        self
    }
}

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Loads jobs from a JSON file. A missing file yields an empty corpus.
pub fn load_corpus(path: &Path) -> Result<Vec<Job>, CorpusError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "⚠️  no corpus found, serving an empty job board");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let jobs: Vec<Job> = serde_json::from_str(&content).map_err(|source| CorpusError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), jobs = jobs.len(), "📂 loaded jobs");
    Ok(jobs)
}

/// Shared application state
pub struct AppState {
    jobs: Vec<Job>,
    config: ServerConfig,
}

impl AppState {
    pub fn new(jobs: Vec<Job>, config: ServerConfig) -> Self {
        Self { jobs, config }
    }
}

/// Error body: `{ "error": "...", "fields": [...] }`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Application is invalid")]
    InvalidApplication(Vec<FieldError>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Query(QueryError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::InvalidApplication(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let error = self.to_string();
        let fields = match self {
            ApiError::InvalidApplication(fields) => fields,
            ApiError::Query(_) => Vec::new(),
        };
        (status, Json(ErrorBody { error, fields })).into_response()
    }
}

/// Handler for GET /jobs?search=&location=&minSalary=&maxSalary=&page=&limit=
async fn jobs_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JobsRequest>,
) -> Result<Json<QueryResult<Job>>, ApiError> {
    tokio::time::sleep(state.config.list_delay).await;

    let result = common::query(&state.jobs, &params.criteria(), params.page, params.limit)?;
    tracing::info!(
        search = %params.search,
        location = %params.location,
        page = params.page,
        total = result.total_items,
        "🔍 listed jobs"
    );
    Ok(Json(result))
}

/// Handler for GET /jobs/{id}
async fn job_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Job>, ApiError> {
    tokio::time::sleep(state.config.detail_delay).await;

    let job = common::find_by_id(&state.jobs, &id)?;
    Ok(Json(job.clone()))
}

/// Handler for POST /applications
async fn apply_handler(
    State(state): State<Arc<AppState>>,
    Json(application): Json<Application>,
) -> Result<(StatusCode, Json<ApplicationReceipt>), ApiError> {
    tokio::time::sleep(state.config.submit_delay).await;

    let errors = application.validate();
    if !errors.is_empty() {
        tracing::info!(job_id = %application.job_id, errors = errors.len(), "rejected application");
        return Err(ApiError::InvalidApplication(errors));
    }
    common::find_by_id(&state.jobs, &application.job_id)?;

    // the résumé is acknowledged, not stored
    let receipt = ApplicationReceipt::new(application.job_id.clone());
    tracing::info!(
        job_id = %application.job_id,
        receipt = %receipt.id,
        resume = %application.resume.name,
        resume_bytes = application.resume.size,
        "📨 application received"
    );
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Handler for GET / (root)
async fn root_handler() -> &'static str {
    "💼 Job Board API\n\nEndpoints:\n  GET  /jobs?search=&location=&minSalary=&maxSalary=&page=&limit= - List jobs\n  GET  /jobs/{id} - Job details\n  POST /applications - Apply to a job\n\nExample:\n  curl 'http://127.0.0.1:3000/jobs?search=rust&location=remote'"
}

/// Builds the API router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/jobs", get(jobs_handler))
        .route("/jobs/{id}", get(job_handler))
        .route("/applications", post(apply_handler))
        .with_state(state)
}
