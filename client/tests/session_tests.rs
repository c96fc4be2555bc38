use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use client::{
    AddressBar, BrowseSession, ClientError, FilterConfig, FilterSync, JobTransport, ListView, MemoryAddress,
    ScrollState, SessionEvent, SimulatedTransport,
};
use common::{Application, ApplicationReceipt, FilterCriteria, Job, JobsRequest, QueryResult};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn corpus(n: usize) -> Vec<Job> {
    (1..=n)
        .map(|i| Job {
            id: i.to_string(),
            title: format!("Engineer {i}"),
            company: if i % 2 == 0 { "Initech" } else { "Globex" }.to_string(),
            location: "Remote".to_string(),
            salary_min: 60_000,
            salary_max: 120_000,
            description: format!("Role number {i}"),
            company_website: "https://example.com".to_string(),
            posted_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        })
        .collect()
}

/// Wraps the simulated backend, recording requests and failing on demand.
struct ScriptedTransport {
    inner: SimulatedTransport,
    requests: Mutex<Vec<JobsRequest>>,
    fail_next: AtomicBool,
}

impl ScriptedTransport {
    fn new(jobs: Vec<Job>) -> Self {
        Self {
            inner: SimulatedTransport::new(jobs),
            requests: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    fn requests(&self) -> Vec<JobsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobTransport for ScriptedTransport {
    async fn fetch_jobs(&self, request: &JobsRequest) -> client::Result<QueryResult<Job>> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(100)).await;
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        self.inner.fetch_jobs(request).await
    }

    async fn fetch_job_by_id(&self, id: &str) -> client::Result<Job> {
        self.inner.fetch_job_by_id(id).await
    }

    async fn submit_application(
        &self,
        application: &Application,
    ) -> client::Result<ApplicationReceipt> {
        self.inner.submit_application(application).await
    }
}

struct Harness {
    address: Arc<MemoryAddress>,
    filters: FilterSync,
    transport: Arc<ScriptedTransport>,
    session: BrowseSession,
    visibility: mpsc::UnboundedSender<bool>,
    sensor: mpsc::UnboundedReceiver<bool>,
}

impl Harness {
    fn new(jobs: Vec<Job>, query: &str, limit: u32) -> Self {
        let address = Arc::new(MemoryAddress::new(query));
        let filters = FilterSync::new(address.clone(), FilterConfig::default());
        let transport = Arc::new(ScriptedTransport::new(jobs));
        let session = BrowseSession::new(transport.clone(), filters.subscribe(), limit).unwrap();
        let (visibility, sensor) = mpsc::unbounded_channel();
        Self {
            address,
            filters,
            transport,
            session,
            visibility,
            sensor,
        }
    }

    async fn step(&mut self) -> SessionEvent {
        self.session.step(&mut self.sensor).await
    }

    /// Steps until `done` accepts an event, returning everything seen.
    async fn step_until(&mut self, done: impl Fn(&SessionEvent) -> bool) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..50 {
            let event = self.step().await;
            let finished = done(&event);
            events.push(event);
            if finished {
                return events;
            }
        }
        panic!("condition not reached, saw {events:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_scrolling_walks_all_pages_then_exhausts() {
    let mut h = Harness::new(corpus(25), "", 10);
    h.session.start();
    assert_eq!(h.session.view(), ListView::Loading);

    assert_eq!(
        h.step().await,
        SessionEvent::PageLoaded { page: 1, items: 10 }
    );
    assert_eq!(h.session.total_items(), 25);
    assert_eq!(h.session.total_pages(), 3);
    assert_eq!(h.session.scroll_state(), ScrollState::Idle);

    h.visibility.send(true).unwrap();
    assert_eq!(
        h.step().await,
        SessionEvent::Visibility {
            visible: true,
            requested: Some(2)
        }
    );
    // still visible after page 2, so page 3 follows on its own
    assert_eq!(
        h.step().await,
        SessionEvent::PageLoaded { page: 2, items: 10 }
    );
    assert_eq!(
        h.step().await,
        SessionEvent::PageLoaded { page: 3, items: 5 }
    );

    assert!(h.session.is_exhausted());
    let ids: Vec<String> = h.session.jobs().iter().map(|j| j.id.clone()).collect();
    let expected: Vec<String> = (1..=25).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);

    h.visibility.send(false).unwrap();
    h.visibility.send(true).unwrap();
    h.step().await;
    assert_eq!(
        h.step().await,
        SessionEvent::Visibility {
            visible: true,
            requested: None
        }
    );
    assert_eq!(h.transport.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_visibility_flapping_during_fetch_issues_one_request() {
    let mut h = Harness::new(corpus(25), "", 10);
    h.session.start();
    for visible in [true, false, true, false] {
        h.visibility.send(visible).unwrap();
    }

    let events = h
        .step_until(|e| matches!(e, SessionEvent::PageLoaded { page: 1, .. }))
        .await;
    assert!(events.iter().all(|e| !matches!(
        e,
        SessionEvent::Visibility {
            requested: Some(_),
            ..
        }
    )));
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_criteria_change_discards_in_flight_page() {
    let mut h = Harness::new(corpus(25), "", 10);
    h.session.start();

    h.filters
        .set_criteria(FilterCriteria::default().with_search("initech"));
    assert_eq!(
        h.step().await,
        SessionEvent::CriteriaChanged { generation: 1 }
    );

    let events = h
        .step_until(|e| matches!(e, SessionEvent::PageLoaded { .. }))
        .await;
    let events = if events
        .iter()
        .any(|e| matches!(e, SessionEvent::StaleDiscarded { .. }))
    {
        events
    } else {
        h.step_until(|e| matches!(e, SessionEvent::StaleDiscarded { .. }))
            .await
    };
    assert!(!events.is_empty());

    assert_eq!(h.session.generation(), 1);
    assert_eq!(h.session.total_items(), 12);
    assert!(h.session.jobs().iter().all(|j| j.company == "Initech"));
    assert_eq!(h.session.jobs().len(), 10);
    assert_eq!(h.address.query(), "search=initech");

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().any(|r| r.search.is_empty() && r.page == 1));
    assert!(requests.iter().any(|r| r.search == "initech" && r.page == 1));
}

#[tokio::test(start_paused = true)]
async fn test_typing_triggers_a_single_requery() {
    let mut h = Harness::new(corpus(25), "", 10);
    h.session.start();
    h.step().await;

    for text in ["e", "en", "eng", "engineer 2"] {
        h.filters.set_search(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let events = h
        .step_until(|e| matches!(e, SessionEvent::PageLoaded { .. }))
        .await;
    assert_eq!(events[0], SessionEvent::CriteriaChanged { generation: 1 });

    // "Engineer 2" and "Engineer 20".."Engineer 25"
    assert_eq!(h.session.total_items(), 7);
    let searches: Vec<String> = h
        .transport
        .requests()
        .into_iter()
        .map(|r| r.search)
        .collect();
    assert_eq!(searches, vec!["".to_string(), "engineer 2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_initial_criteria_come_from_address() {
    let mut h = Harness::new(corpus(25), "?search=globex&minSalary=130000", 10);
    h.session.start();
    h.step().await;

    assert_eq!(h.session.criteria().search, "globex");
    assert_eq!(h.session.view(), ListView::Empty);
    assert_eq!(h.session.scroll_state(), ScrollState::Exhausted);
}

#[tokio::test(start_paused = true)]
async fn test_failed_first_page_shows_error_until_retried() {
    let mut h = Harness::new(corpus(25), "", 10);
    h.transport.fail_next.store(true, Ordering::SeqCst);
    h.session.start();

    let event = h.step().await;
    assert!(matches!(event, SessionEvent::PageFailed { page: 1, .. }));
    assert_eq!(
        h.session.view(),
        ListView::Error("Transport error: connection reset")
    );

    // nothing is retried on its own
    h.visibility.send(true).unwrap();
    assert_eq!(
        h.step().await,
        SessionEvent::Visibility {
            visible: true,
            requested: Some(1)
        }
    );
    let events = h
        .step_until(|e| matches!(e, SessionEvent::PageLoaded { page: 1, .. }))
        .await;
    assert_eq!(events.len(), 1);
    assert!(h.session.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_failed_next_page() {
    let mut h = Harness::new(corpus(25), "", 10);
    h.session.start();
    h.step().await;

    h.transport.fail_next.store(true, Ordering::SeqCst);
    h.visibility.send(true).unwrap();
    h.step().await;
    assert!(matches!(
        h.step().await,
        SessionEvent::PageFailed { page: 2, .. }
    ));
    match h.session.view() {
        ListView::Jobs { jobs, error, .. } => {
            assert_eq!(jobs.len(), 10);
            assert_eq!(error, Some("Transport error: connection reset"));
        }
        other => panic!("expected jobs with an inline error, got {other:?}"),
    }

    assert_eq!(h.session.retry(), Some(2));
    assert!(h.session.error().is_none());
    assert!(matches!(
        h.session.view(),
        ListView::Jobs {
            error: None,
            fetching_more: true,
            ..
        }
    ));
    assert!(matches!(
        h.step().await,
        SessionEvent::PageLoaded { page: 2, items: 10 }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_run_stops_on_shutdown() {
    let mut h = Harness::new(corpus(5), "", 10);
    h.session.start();

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let counter = Arc::new(AtomicUsize::new(0));
    let observed = counter.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        observed.fetch_add(1, Ordering::SeqCst);
        trigger.cancel();
    });

    h.session.run(&mut h.sensor, shutdown).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.jobs().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_closed_sensor_ends_the_session() {
    let Harness {
        mut session,
        mut sensor,
        visibility,
        filters: _filters,
        ..
    } = Harness::new(corpus(25), "", 10);
    session.start();
    drop(visibility);

    assert_eq!(session.step(&mut sensor).await, SessionEvent::Closed);

    let finished = tokio::time::timeout(
        Duration::from_secs(3600),
        session.run(&mut sensor, CancellationToken::new()),
    )
    .await;
    assert!(finished.is_ok());
}

#[tokio::test]
async fn test_zero_page_size_is_rejected() {
    let address = Arc::new(MemoryAddress::new(""));
    let filters = FilterSync::new(address, FilterConfig::default());
    let transport = Arc::new(SimulatedTransport::new(corpus(1)));
    assert!(matches!(
        BrowseSession::new(transport, filters.subscribe(), 0),
        Err(ClientError::InvalidArgument(_))
    ));
}
