//! Shared state handed to the HTTP handlers.

use tokio::sync::watch;

use crate::manager::PollState;
use crate::metrics::MetricsRegistry;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry rendered by `/metrics`.
    pub metrics: MetricsRegistry,
    /// Latest state of the poll loop.
    pub poll_state: watch::Receiver<PollState>,
}

impl AppState {
    pub fn new(metrics: MetricsRegistry, poll_state: watch::Receiver<PollState>) -> Self {
        Self {
            metrics,
            poll_state,
        }
    }

    pub fn poll_state(&self) -> PollState {
        *self.poll_state.borrow()
    }
}
