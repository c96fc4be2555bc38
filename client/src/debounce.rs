//! Trailing-edge debouncing
//!
//! A [`Debouncer`] owns at most one scheduled invocation. Re-arming it
//! aborts the previous one, so a burst of calls produces a single call
//! carrying the arguments of the last one.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    delay: Duration,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: None,
        }
    }

    /// Schedules `callback(value)` after the quiet period, dropping any
    /// call still waiting. Never runs the callback synchronously, even with
    /// a zero delay. Must be called from within a tokio runtime.
    pub fn call(&mut self, value: T) {
        self.cancel();

        let callback = Arc::clone(&self.callback);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(value);
        }));
    }
}

impl<T> Debouncer<T> {
    /// Drops the scheduled call, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
