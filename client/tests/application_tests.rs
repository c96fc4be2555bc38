use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use client::{
    ApplicationForm, ClientError, DetailView, JobTransport, ResumeFile, SimulatedTransport,
    TransportDelays, load_detail,
};
use common::application::{DOCX_MIME, PDF_MIME};
use common::{Application, ApplicationReceipt, Job, JobsRequest, QueryResult};

const MB: usize = 1024 * 1024;

fn corpus() -> Vec<Job> {
    vec![Job {
        id: "rust-1".to_string(),
        title: "Rust Engineer".to_string(),
        company: "Ferrous Systems".to_string(),
        location: "Berlin, Germany".to_string(),
        salary_min: 90_000,
        salary_max: 150_000,
        description: "Build embedded tooling.".to_string(),
        company_website: "https://ferrous.example.com".to_string(),
        posted_at: Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap(),
    }]
}

fn form(job_id: &str, resume: ResumeFile) -> ApplicationForm {
    let mut form = ApplicationForm::new(job_id);
    form.set_full_name("Grace Hopper");
    form.set_email("grace@example.com");
    form.set_resume(Some(resume));
    form.set_cover_letter("Compilers are my thing and I want to write more of them.");
    form
}

/// Backend that is down.
struct OfflineTransport;

#[async_trait]
impl JobTransport for OfflineTransport {
    async fn fetch_jobs(&self, _request: &JobsRequest) -> client::Result<QueryResult<Job>> {
        Err(ClientError::Transport("offline".to_string()))
    }

    async fn fetch_job_by_id(&self, _id: &str) -> client::Result<Job> {
        Err(ClientError::Transport("offline".to_string()))
    }

    async fn submit_application(
        &self,
        _application: &Application,
    ) -> client::Result<ApplicationReceipt> {
        Err(ClientError::Transport("offline".to_string()))
    }
}

/// Simulated backend that counts submissions.
struct CountingTransport {
    inner: SimulatedTransport,
    submissions: AtomicUsize,
}

#[async_trait]
impl JobTransport for CountingTransport {
    async fn fetch_jobs(&self, request: &JobsRequest) -> client::Result<QueryResult<Job>> {
        self.inner.fetch_jobs(request).await
    }

    async fn fetch_job_by_id(&self, id: &str) -> client::Result<Job> {
        self.inner.fetch_job_by_id(id).await
    }

    async fn submit_application(
        &self,
        application: &Application,
    ) -> client::Result<ApplicationReceipt> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.inner.submit_application(application).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_submit_waits_for_simulated_backend() {
    let transport = SimulatedTransport::new(corpus());
    let form = form("rust-1", ResumeFile::new("cv.pdf", PDF_MIME, vec![0; 4 * MB]));
    assert!(form.can_submit());

    let started = tokio::time::Instant::now();
    let receipt = form.submit(&transport).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(receipt.job_id, "rust-1");
}

#[tokio::test(start_paused = true)]
async fn test_oversized_resume_never_reaches_transport() {
    let form = form("rust-1", ResumeFile::new("cv.docx", DOCX_MIME, vec![0; 6 * MB]));

    let err = form.submit(&OfflineTransport).await.unwrap_err();
    match err {
        ClientError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "File size should be less than 5MB");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_is_refused_while_first_is_in_flight() {
    let transport = CountingTransport {
        inner: SimulatedTransport::new(corpus()),
        submissions: AtomicUsize::new(0),
    };
    let form = form("rust-1", ResumeFile::new("cv.pdf", PDF_MIME, b"%PDF-1.7".to_vec()));

    let (first, (blocked, second)) = tokio::join!(form.submit(&transport), async {
        tokio::task::yield_now().await;
        let blocked = form.is_submitting() && !form.can_submit();
        (blocked, form.submit(&transport).await)
    });

    assert!(blocked);
    assert_eq!(first.unwrap().job_id, "rust-1");
    assert!(matches!(second, Err(ClientError::InvalidArgument(_))));
    assert_eq!(transport.submissions.load(Ordering::SeqCst), 1);
    assert!(!form.is_submitting());
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_transport_failure_leaves_form_intact() {
    let form = form("rust-1", ResumeFile::new("cv.pdf", PDF_MIME, b"%PDF-1.7".to_vec()));

    let err = form.submit(&OfflineTransport).await.unwrap_err();
    assert_eq!(err, ClientError::Transport("offline".to_string()));
    assert!(!form.is_submitting());
    assert!(form.can_submit());
    assert_eq!(form.to_application().unwrap().full_name, "Grace Hopper");
}

#[tokio::test]
async fn test_unknown_job_is_rejected_by_backend() {
    let transport = SimulatedTransport::new(corpus()).with_delays(TransportDelays::none());
    let form = form("nope", ResumeFile::new("cv.pdf", PDF_MIME, vec![1; 10]));
    assert_eq!(
        form.submit(&transport).await,
        Err(ClientError::NotFound("nope".to_string()))
    );
}

#[tokio::test]
async fn test_detail_views() {
    let transport = SimulatedTransport::new(corpus()).with_delays(TransportDelays::none());

    match load_detail(&transport, "rust-1").await.unwrap() {
        DetailView::Loaded(job) => {
            assert_eq!(job.company_initials(), "FS");
            assert_eq!(job.salary_range(), "$90,000 - $150,000");
        }
        other => panic!("expected job, got {other:?}"),
    }

    assert_eq!(
        load_detail(&transport, "missing").await.unwrap(),
        DetailView::NotFound("missing".to_string())
    );
    assert!(matches!(
        load_detail(&OfflineTransport, "rust-1").await,
        Err(ClientError::Transport(_))
    ));
}
