//! Shared job board model
//!
//! The job corpus, filter criteria, paginated results and the query
//! engine used by both the simulated backend and the browsing client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod application;
pub mod criteria;
pub mod error;
pub mod format;
pub mod query;

pub use application::{Application, ApplicationReceipt, FieldError, ResumeUpload};
pub use criteria::{DEFAULT_MAX_SALARY, FilterCriteria, JobsRequest};
pub use error::QueryError;
pub use query::{DEFAULT_LIMIT, find_by_id, matches, query};

/// A single job posting. Postings are read-only once loaded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary_min: u64,
    pub salary_max: u64,
    pub description: String,
    pub company_website: String,
    pub posted_at: DateTime<Utc>,
}

/// One page of matches plus the cursor for the page after it.
///
/// `next_page` is `None` exactly when this page is the last one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub data: Vec<T>,
    pub next_page: Option<u32>,
    pub total_pages: u32,
    pub total_items: u32,
}

impl<T> QueryResult<T> {
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}
