//! Filter state synchronizer
//!
//! Holds the committed [`FilterCriteria`] as the single source of truth,
//! publishes every commit on a watch channel and mirrors it to the
//! address bar. Search, location and salary edits each go through their
//! own debounce window; direct loads from the address commit immediately.

use std::sync::Arc;
use std::time::Duration;

use common::FilterCriteria;
use tokio::sync::watch;

use crate::address::AddressBar;
use crate::debounce::Debouncer;

/// Quiet period applied to every field group.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub debounce: Duration,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Committed criteria tagged with the commit counter. Any result fetched
/// under an older generation is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    pub criteria: FilterCriteria,
    pub generation: u64,
}

pub struct FilterSync {
    state: Arc<watch::Sender<FilterSnapshot>>,
    address: Arc<dyn AddressBar>,
    search: Debouncer<String>,
    location: Debouncer<String>,
    salary: Debouncer<(u64, u64)>,
}

/// Applies `update` and, if the criteria actually changed, bumps the
/// generation and rewrites the address. Returns whether a commit happened.
fn commit(
    state: &watch::Sender<FilterSnapshot>,
    address: &dyn AddressBar,
    update: impl FnOnce(&mut FilterCriteria),
) -> bool {
    state.send_if_modified(|snapshot| {
        let mut next = snapshot.criteria.clone();
        update(&mut next);
        if next == snapshot.criteria {
            return false;
        }

        snapshot.criteria = next;
        snapshot.generation += 1;
        let query = snapshot.criteria.to_query_string();
        address.replace_query(&query);
        tracing::debug!(generation = snapshot.generation, query = %query, "filters committed");
        true
    })
}

impl FilterSync {
    /// Starts from whatever the address currently holds, at generation 0.
    pub fn new(address: Arc<dyn AddressBar>, config: FilterConfig) -> Self {
        let initial = FilterSnapshot {
            criteria: FilterCriteria::from_query_string(&address.query()),
            generation: 0,
        };
        let (sender, _) = watch::channel(initial);
        let state = Arc::new(sender);

        let search = {
            let state = Arc::clone(&state);
            let address = Arc::clone(&address);
            Debouncer::new(config.debounce, move |text: String| {
                commit(&state, address.as_ref(), |criteria| criteria.search = text);
            })
        };

        let location = {
            let state = Arc::clone(&state);
            let address = Arc::clone(&address);
            Debouncer::new(config.debounce, move |text: String| {
                commit(&state, address.as_ref(), |criteria| criteria.location = text);
            })
        };

        let salary = {
            let state = Arc::clone(&state);
            let address = Arc::clone(&address);
            Debouncer::new(config.debounce, move |(min, max): (u64, u64)| {
                commit(&state, address.as_ref(), |criteria| {
                    criteria.min_salary = min;
                    criteria.max_salary = max;
                });
            })
        };

        Self {
            state,
            address,
            search,
            location,
            salary,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterSnapshot> {
        self.state.subscribe()
    }

    pub fn current(&self) -> FilterSnapshot {
        self.state.borrow().clone()
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search.call(text.into());
    }

    pub fn set_location(&mut self, text: impl Into<String>) {
        self.location.call(text.into());
    }

    /// Both bounds share one debounce window.
    pub fn set_salary(&mut self, min: u64, max: u64) {
        self.salary.call((min, max));
    }

    /// Commits `criteria` immediately. Edits still waiting in a debounce
    /// window are dropped, since they were typed against the old state.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> bool {
        self.cancel_pending();
        commit(&self.state, self.address.as_ref(), |current| *current = criteria)
    }

    /// Re-reads the address (initial load, back navigation) and commits it
    /// immediately.
    pub fn load_from_address(&mut self) -> bool {
        let criteria = FilterCriteria::from_query_string(&self.address.query());
        self.set_criteria(criteria)
    }

    pub fn has_pending(&self) -> bool {
        self.search.is_pending() || self.location.is_pending() || self.salary.is_pending()
    }

    fn cancel_pending(&mut self) {
        self.search.cancel();
        self.location.cancel();
        self.salary.cancel();
    }
}
