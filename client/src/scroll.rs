//! Infinite scroll coordinator
//!
//! Decides when the next page may be fetched. At most one fetch is
//! outstanding; visibility signals that arrive meanwhile are not queued.

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    /// Waiting for the sentinel to come into view.
    Idle,
    /// A page fetch is outstanding.
    Fetching,
    /// The last fetched page had no successor.
    Exhausted,
}

/// A page fetch, tagged with the criteria generation it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub page: u32,
}

/// Outcome of reporting a finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result belongs to the outstanding request. `follow_up` is set when
    /// the sentinel is still in view and another page exists.
    Applied { follow_up: Option<PageRequest> },
    /// The result does not match the outstanding request and must be dropped.
    Stale,
}

#[derive(Debug)]
pub struct ScrollCoordinator {
    state: ScrollState,
    generation: u64,
    next_page: Option<u32>,
    outstanding: Option<PageRequest>,
    sentinel_visible: bool,
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self {
            state: ScrollState::Idle,
            generation: 0,
            next_page: Some(1),
            outstanding: None,
            sentinel_visible: false,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn next_page(&self) -> Option<u32> {
        self.next_page
    }

    pub fn outstanding(&self) -> Option<PageRequest> {
        self.outstanding
    }

    /// Back to `Idle` at page 1 for a new criteria generation. Whatever was
    /// in flight becomes stale.
    pub fn reset(&mut self, generation: u64) {
        self.state = ScrollState::Idle;
        self.generation = generation;
        self.next_page = Some(1);
        self.outstanding = None;
    }

    /// Starts fetching the next page if idle and a cursor remains.
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.state != ScrollState::Idle {
            return None;
        }
        let page = self.next_page?;

        let request = PageRequest {
            generation: self.generation,
            page,
        };
        self.state = ScrollState::Fetching;
        self.outstanding = Some(request);
        Some(request)
    }

    /// Records a sentinel visibility signal. Only a transition into view can
    /// start a fetch.
    pub fn on_visibility(&mut self, visible: bool) -> Option<PageRequest> {
        let became_visible = visible && !self.sentinel_visible;
        self.sentinel_visible = visible;

        if became_visible {
            self.request_next()
        } else {
            None
        }
    }

    /// Reports a successful fetch of `request` whose result carried `next_page`.
    pub fn complete(&mut self, request: PageRequest, next_page: Option<u32>) -> Completion {
        if self.outstanding != Some(request) {
            return Completion::Stale;
        }
        self.outstanding = None;
        self.next_page = next_page;

        match next_page {
            Some(_) => {
                self.state = ScrollState::Idle;
                let follow_up = if self.sentinel_visible {
                    self.request_next()
                } else {
                    None
                };
                Completion::Applied { follow_up }
            }
            None => {
                self.state = ScrollState::Exhausted;
                Completion::Applied { follow_up: None }
            }
        }
    }

    /// Reports a failed fetch. The cursor stays put; nothing is retried.
    pub fn fail(&mut self, request: PageRequest) -> bool {
        if self.outstanding != Some(request) {
            return false;
        }
        self.outstanding = None;
        self.state = ScrollState::Idle;
        true
    }
}
