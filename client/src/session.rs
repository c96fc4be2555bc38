//! Browse session
//!
//! Drives the job list: re-queries from page 1 whenever the filters
//! commit, pages forward when the scroll sentinel comes into view, and
//! drops results fetched under criteria that are no longer current.
//! Fetches run as spawned tasks and report back over a channel, so a
//! slow page never blocks filter changes.

use std::sync::Arc;

use async_trait::async_trait;
use common::{FilterCriteria, Job, JobsRequest, QueryResult};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::filters::FilterSnapshot;
use crate::scroll::{Completion, PageRequest, ScrollCoordinator, ScrollState};
use crate::transport::JobTransport;

type FetchOutcome = (PageRequest, Result<QueryResult<Job>>);

/// Source of edge-triggered sentinel visibility changes.
#[async_trait]
pub trait VisibilitySensor: Send {
    /// Next visibility value, or `None` once the sensor is gone.
    async fn next_change(&mut self) -> Option<bool>;
}

#[async_trait]
impl VisibilitySensor for mpsc::Receiver<bool> {
    async fn next_change(&mut self) -> Option<bool> {
        self.recv().await
    }
}

#[async_trait]
impl VisibilitySensor for mpsc::UnboundedReceiver<bool> {
    async fn next_change(&mut self) -> Option<bool> {
        self.recv().await
    }
}

/// What a single [`BrowseSession::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// New criteria were picked up and page 1 requested.
    CriteriaChanged { generation: u64 },
    /// A visibility signal arrived; `requested` is the page it triggered.
    Visibility { visible: bool, requested: Option<u32> },
    PageLoaded { page: u32, items: usize },
    PageFailed { page: u32, reason: String },
    /// A result for superseded criteria was dropped.
    StaleDiscarded { page: u32 },
    /// The filter source or the sensor went away.
    Closed,
}

/// What the list area should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    /// Loaded jobs; `error` carries the reason a later page failed.
    Jobs {
        jobs: &'a [Job],
        total_items: u32,
        fetching_more: bool,
        error: Option<&'a str>,
    },
}

pub struct BrowseSession {
    transport: Arc<dyn JobTransport>,
    filters: watch::Receiver<FilterSnapshot>,
    criteria: FilterCriteria,
    generation: u64,
    limit: u32,
    scroll: ScrollCoordinator,
    jobs: Vec<Job>,
    total_items: u32,
    total_pages: u32,
    error: Option<String>,
    completions_tx: mpsc::UnboundedSender<FetchOutcome>,
    completions_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl BrowseSession {
    pub fn new(
        transport: Arc<dyn JobTransport>,
        mut filters: watch::Receiver<FilterSnapshot>,
        limit: u32,
    ) -> Result<Self> {
        if limit == 0 {
            return Err(ClientError::InvalidArgument(
                "page size must be at least 1".to_string(),
            ));
        }

        let snapshot = filters.borrow_and_update().clone();
        let mut scroll = ScrollCoordinator::new();
        scroll.reset(snapshot.generation);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Ok(Self {
            transport,
            filters,
            criteria: snapshot.criteria,
            generation: snapshot.generation,
            limit,
            scroll,
            jobs: Vec::new(),
            total_items: 0,
            total_pages: 0,
            error: None,
            completions_tx,
            completions_rx,
        })
    }

    /// Requests the first page for the current criteria.
    pub fn start(&mut self) {
        let request = self.scroll.request_next();
        self.dispatch(request);
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    pub fn is_exhausted(&self) -> bool {
        self.scroll.state() == ScrollState::Exhausted
    }

    pub fn view(&self) -> ListView<'_> {
        if let Some(reason) = &self.error {
            if self.jobs.is_empty() {
                return ListView::Error(reason);
            }
        }
        let fetching = self.scroll.state() == ScrollState::Fetching;

        if self.jobs.is_empty() {
            if fetching {
                ListView::Loading
            } else {
                ListView::Empty
            }
        } else {
            ListView::Jobs {
                jobs: &self.jobs,
                total_items: self.total_items,
                fetching_more: fetching,
                error: self.error.as_deref(),
            }
        }
    }

    /// Waits for the next event and applies it.
    pub async fn step<S>(&mut self, sensor: &mut S) -> SessionEvent
    where
        S: VisibilitySensor + ?Sized,
    {
        tokio::select! {
            changed = self.filters.changed() => match changed {
                Ok(()) => self.on_criteria_changed(),
                Err(_) => SessionEvent::Closed,
            },
            visible = sensor.next_change() => match visible {
                Some(visible) => self.on_visibility(visible),
                None => SessionEvent::Closed,
            },
            Some((request, outcome)) = self.completions_rx.recv() => {
                self.on_completion(request, outcome)
            }
        }
    }

    /// Processes events until `shutdown` fires or an input closes.
    pub async fn run<S>(&mut self, sensor: &mut S, shutdown: CancellationToken)
    where
        S: VisibilitySensor + ?Sized,
    {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.step(sensor) => {
                    if event == SessionEvent::Closed {
                        break;
                    }
                }
            }
        }
        tracing::debug!(generation = self.generation, jobs = self.jobs.len(), "session stopped");
    }

    /// Re-requests the page that failed last. Nothing is retried automatically.
    pub fn retry(&mut self) -> Option<u32> {
        self.error.as_ref()?;
        let request = self.scroll.request_next()?;
        self.error = None;
        self.dispatch(Some(request));
        Some(request.page)
    }

    fn on_criteria_changed(&mut self) -> SessionEvent {
        let snapshot = self.filters.borrow_and_update().clone();
        if snapshot.generation == self.generation {
            return SessionEvent::CriteriaChanged {
                generation: self.generation,
            };
        }

        tracing::info!(
            generation = snapshot.generation,
            search = %snapshot.criteria.search,
            location = %snapshot.criteria.location,
            min_salary = snapshot.criteria.min_salary,
            max_salary = snapshot.criteria.max_salary,
            "criteria changed, restarting from page 1"
        );
        self.criteria = snapshot.criteria;
        self.generation = snapshot.generation;
        self.jobs.clear();
        self.total_items = 0;
        self.total_pages = 0;
        self.error = None;
        self.scroll.reset(self.generation);
        self.start();

        SessionEvent::CriteriaChanged {
            generation: self.generation,
        }
    }

    fn on_visibility(&mut self, visible: bool) -> SessionEvent {
        let request = self.scroll.on_visibility(visible);
        self.dispatch(request);
        SessionEvent::Visibility {
            visible,
            requested: request.map(|r| r.page),
        }
    }

    fn on_completion(&mut self, request: PageRequest, outcome: Result<QueryResult<Job>>) -> SessionEvent {
        if request.generation != self.generation {
            tracing::debug!(
                page = request.page,
                issued = request.generation,
                current = self.generation,
                "discarding stale page"
            );
            return SessionEvent::StaleDiscarded { page: request.page };
        }

        match outcome {
            Ok(result) => match self.scroll.complete(request, result.next_page) {
                Completion::Stale => SessionEvent::StaleDiscarded { page: request.page },
                Completion::Applied { follow_up } => {
                    let items = result.data.len();
                    self.jobs.extend(result.data);
                    self.total_items = result.total_items;
                    self.total_pages = result.total_pages;
                    self.error = None;
                    tracing::debug!(page = request.page, items, total = self.total_items, "page loaded");
                    self.dispatch(follow_up);
                    SessionEvent::PageLoaded {
                        page: request.page,
                        items,
                    }
                }
            },
            Err(err) => {
                if !self.scroll.fail(request) {
                    return SessionEvent::StaleDiscarded { page: request.page };
                }
                tracing::warn!(page = request.page, error = %err, "query failed");
                let reason = err.to_string();
                self.error = Some(reason.clone());
                SessionEvent::PageFailed {
                    page: request.page,
                    reason,
                }
            }
        }
    }

    fn dispatch(&self, request: Option<PageRequest>) {
        let Some(request) = request else {
            return;
        };

        let transport = Arc::clone(&self.transport);
        let query = JobsRequest::new(&self.criteria, request.page, self.limit);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = transport.fetch_jobs(&query).await;
            // receiver gone means the session was dropped
            let _ = completions.send((request, outcome));
        });
    }
}
