//! Background poll loop driving periodic reconciliation.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::sync::TableManager;

/// Lifecycle of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    /// Waiting for the next tick.
    Idle,
    /// A reconciliation pass is in flight.
    Running,
    /// The loop has exited.
    Stopped,
}

/// Handle to a running poll loop.
///
/// Dropping the handle without calling [`PollHandle::stop`] also ends the
/// loop after its current pass, but nothing waits for it.
pub struct PollHandle {
    shutdown_tx: oneshot::Sender<()>,
    state_rx: watch::Receiver<PollState>,
    task: JoinHandle<()>,
}

impl PollHandle {
    #[cfg(test)]
    pub fn state(&self) -> PollState {
        *self.state_rx.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    /// Signals the loop to exit and waits for it.
    ///
    /// A pass already in flight runs to completion first. No store call is
    /// made after this returns.
    pub async fn stop(self) {
        // The loop may already be gone if its task panicked.
        let _ = self.shutdown_tx.send(());
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "Poll loop task failed");
        }
    }
}

impl TableManager {
    /// Runs one pass immediately, then one per `poll_interval`, until stopped.
    pub fn start(self: Arc<Self>) -> PollHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(PollState::Idle);

        let task = tokio::spawn(async move {
            self.run_loop(shutdown_rx, state_tx).await;
        });

        PollHandle {
            shutdown_tx,
            state_rx,
            task,
        }
    }

    async fn run_loop(
        &self,
        mut shutdown_rx: oneshot::Receiver<()>,
        state_tx: watch::Sender<PollState>,
    ) {
        let period = self.config().poll_interval;
        tracing::info!(poll_interval = ?period, "Table manager started");

        self.poll_once(&state_tx).await;

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    tracing::info!("Table manager stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.poll_once(&state_tx).await;
                }
            }
        }

        state_tx.send_replace(PollState::Stopped);
    }

    async fn poll_once(&self, state_tx: &watch::Sender<PollState>) {
        state_tx.send_replace(PollState::Running);
        match self.sync_tables().await {
            Ok(report) => tracing::debug!(?report, "Synced tables"),
            Err(err) => tracing::error!(error = %err, "Error syncing tables"),
        }
        state_tx.send_replace(PollState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tablekeeper_core::config::TableManagerConfig;
    use tablekeeper_core::metrics::NoopMetrics;

    use crate::storage::inmemory::{InMemoryTableStore, StoreOperation};

    const POLL: Duration = Duration::from_secs(120);

    fn manager(store: &InMemoryTableStore) -> Arc<TableManager> {
        let config = TableManagerConfig {
            poll_interval: POLL,
            use_periodic_tables: false,
            ..Default::default()
        };
        let manager =
            TableManager::new(config, Arc::new(store.clone()), Arc::new(NoopMetrics)).unwrap();
        Arc::new(manager)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_right_after_start_runs_one_pass() {
        let store = InMemoryTableStore::new();
        let handle = manager(&store).start();
        let state = handle.subscribe();

        handle.stop().await;

        assert_eq!(store.calls().await.list_tables, 1);
        assert!(store.table("cortex").await.is_some());
        assert_eq!(*state.borrow(), PollState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_passes_follow_poll_interval() {
        let store = InMemoryTableStore::new();
        let handle = manager(&store).start();

        tokio::time::sleep(POLL * 3 + Duration::from_secs(1)).await;
        handle.stop().await;

        assert_eq!(store.calls().await.list_tables, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_calls_after_stop() {
        let store = InMemoryTableStore::new();
        let handle = manager(&store).start();

        tokio::time::sleep(POLL + Duration::from_secs(1)).await;
        handle.stop().await;
        let after_stop = store.calls().await;
        tokio::time::sleep(POLL * 5).await;

        assert_eq!(store.calls().await, after_stop);
        assert_eq!(after_stop.list_tables, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pass_keeps_loop_running() {
        let store = InMemoryTableStore::new();
        store.fail_on(StoreOperation::ListTables).await;
        let handle = manager(&store).start();

        tokio::time::sleep(POLL * 2 + Duration::from_secs(1)).await;
        assert_eq!(handle.state(), PollState::Idle);
        handle.stop().await;

        assert_eq!(store.calls().await.list_tables, 3);
        assert!(store.table("cortex").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_waits_for_in_flight_pass() {
        let store = InMemoryTableStore::new().with_latency(Duration::from_secs(5));
        let handle = manager(&store).start();
        let mut state = handle.subscribe();

        state
            .wait_for(|state| *state == PollState::Running)
            .await
            .unwrap();
        handle.stop().await;

        assert!(store.table("cortex").await.is_some());
        assert_eq!(*state.borrow(), PollState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_ends_loop() {
        let store = InMemoryTableStore::new();
        let handle = manager(&store).start();
        let mut state = handle.subscribe();

        drop(handle);
        state
            .wait_for(|state| *state == PollState::Stopped)
            .await
            .unwrap();

        assert_eq!(store.calls().await.list_tables, 1);
    }

    #[test]
    fn test_poll_state_serializes_lowercase() {
        let json = serde_json::to_string(&PollState::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
