//! Job detail page loading.

use common::Job;

use crate::error::{ClientError, Result};
use crate::transport::JobTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Loaded(Job),
    /// Terminal view for an unknown job id.
    NotFound(String),
}

/// Fetches a job for its detail page. An unknown id renders the not-found
/// view; transport failures are returned to the caller.
pub async fn load_detail(transport: &dyn JobTransport, id: &str) -> Result<DetailView> {
    match transport.fetch_job_by_id(id).await {
        Ok(job) => Ok(DetailView::Loaded(job)),
        Err(ClientError::NotFound(id)) => {
            tracing::info!(%id, "job not found");
            Ok(DetailView::NotFound(id))
        }
        Err(err) => Err(err),
    }
}
