//! HTTP transport against the job board server.

use async_trait::async_trait;
use common::{Application, ApplicationReceipt, FieldError, Job, JobsRequest, QueryResult};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::transport::JobTransport;

/// Error body returned by the server on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    fields: Vec<FieldError>,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidArgument(format!("bad server url {base_url}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidArgument(format!("server url cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Maps a non-success response onto the client error taxonomy.
async fn error_from(response: Response, subject: &str) -> ClientError {
    let status = response.status();
    let body = response.json::<ErrorBody>().await.ok();

    match (status, body) {
        (StatusCode::NOT_FOUND, _) => ClientError::NotFound(subject.to_string()),
        (StatusCode::BAD_REQUEST, Some(body)) => ClientError::InvalidArgument(body.error),
        (StatusCode::UNPROCESSABLE_ENTITY, Some(body)) if !body.fields.is_empty() => {
            ClientError::Validation(body.fields)
        }
        (status, Some(body)) => ClientError::Transport(format!("{status}: {}", body.error)),
        (status, None) => ClientError::Transport(format!("server responded with {status}")),
    }
}

#[async_trait]
impl JobTransport for HttpTransport {
    async fn fetch_jobs(&self, request: &JobsRequest) -> Result<QueryResult<Job>> {
        let url = self.endpoint(&["jobs"])?;
        tracing::debug!(%url, page = request.page, "fetching jobs");

        let response = self.client.get(url).query(request).send().await?;
        if !response.status().is_success() {
            return Err(error_from(response, "jobs").await);
        }
        Ok(response.json().await?)
    }

    async fn fetch_job_by_id(&self, id: &str) -> Result<Job> {
        let url = self.endpoint(&["jobs", id])?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from(response, id).await);
        }
        Ok(response.json().await?)
    }

    async fn submit_application(&self, application: &Application) -> Result<ApplicationReceipt> {
        let url = self.endpoint(&["applications"])?;

        let response = self.client.post(url).json(application).send().await?;
        if !response.status().is_success() {
            return Err(error_from(response, &application.job_id).await);
        }
        Ok(response.json().await?)
    }
}
