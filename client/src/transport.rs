//! Job transports
//!
//! [`JobTransport`] is the seam between the browsing client and whatever
//! serves jobs. [`SimulatedTransport`] answers from an in-process corpus
//! after an artificial delay; [`crate::http::HttpTransport`] talks to the
//! job board server.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{Application, ApplicationReceipt, Job, JobsRequest, QueryResult};

use crate::error::{ClientError, Result};

#[async_trait]
pub trait JobTransport: Send + Sync {
    /// One page of jobs matching the request's criteria.
    async fn fetch_jobs(&self, request: &JobsRequest) -> Result<QueryResult<Job>>;

    async fn fetch_job_by_id(&self, id: &str) -> Result<Job>;

    async fn submit_application(&self, application: &Application) -> Result<ApplicationReceipt>;
}

/// Artificial latency of each simulated call.
#[derive(Debug, Clone)]
pub struct TransportDelays {
    pub list: Duration,
    pub detail: Duration,
    pub submit: Duration,
}

impl Default for TransportDelays {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(100),
            detail: Duration::from_millis(200),
            submit: Duration::from_millis(1000),
        }
    }
}

impl TransportDelays {
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            detail: Duration::ZERO,
            submit: Duration::ZERO,
        }
    }
}

/// Simulated backend over a read-only corpus.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    corpus: Arc<Vec<Job>>,
    delays: TransportDelays,
}

impl SimulatedTransport {
    pub fn new(corpus: Vec<Job>) -> Self {
        Self {
            corpus: Arc::new(corpus),
            delays: TransportDelays::default(),
        }
    }

    pub fn with_delays(mut self, delays: TransportDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Loads the corpus from a JSON array of jobs.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let jobs: Vec<Job> = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), jobs = jobs.len(), "loaded corpus");
        Ok(Self::new(jobs))
    }

    pub fn corpus(&self) -> &[Job] {
        &self.corpus
    }
}

#[async_trait]
impl JobTransport for SimulatedTransport {
    async fn fetch_jobs(&self, request: &JobsRequest) -> Result<QueryResult<Job>> {
        tokio::time::sleep(self.delays.list).await;
        let result = common::query(
            &self.corpus,
            &request.criteria(),
            request.page,
            request.limit,
        )?;
        Ok(result)
    }

    async fn fetch_job_by_id(&self, id: &str) -> Result<Job> {
        tokio::time::sleep(self.delays.detail).await;
        let job = common::find_by_id(&self.corpus, id)?;
        Ok(job.clone())
    }

    async fn submit_application(&self, application: &Application) -> Result<ApplicationReceipt> {
        tokio::time::sleep(self.delays.submit).await;

        let errors = application.validate();
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }
        common::find_by_id(&self.corpus, &application.job_id)?;

        tracing::info!(
            job_id = %application.job_id,
            resume = %application.resume.name,
            resume_bytes = application.resume.size,
            "application received"
        );
        Ok(ApplicationReceipt::new(application.job_id.clone()))
    }
}
