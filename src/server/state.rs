//! Process-wide counters and the worker admission gate.
//!
//! # Responsibilities
//! - Count connected clients, checked expressions, completed and bad jobs,
//!   and every worker ever spawned
//! - Cap the number of workers running at once across all sessions
//! - Hand out consistent snapshots to the statistics reporter
//!
//! # Design Decisions
//! - One mutex guards every counter; callers never touch fields directly
//! - Admission is a fair (FIFO) semaphore, so a job waiting for a slot is
//!   served before any job that asks later
//! - A slot is held by an RAII permit; dropping it releases the slot even
//!   if the worker panicked

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

/// Point-in-time copy of the server counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub connected_clients: u64,
    pub expressions_checked: u64,
    pub completed_jobs: u64,
    pub bad_jobs: u64,
    pub total_workers_spawned: u64,
    /// Workers admitted and not yet finished.
    pub running_workers: u64,
    /// Highest `running_workers` ever observed.
    pub peak_running_workers: u64,
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Connected clients:{}", self.connected_clients)?;
        writeln!(f, "Expressions checked:{}", self.expressions_checked)?;
        writeln!(f, "Completed jobs:{}", self.completed_jobs)?;
        writeln!(f, "Bad jobs:{}", self.bad_jobs)?;
        writeln!(f, "Total threads:{}", self.total_workers_spawned)
    }
}

/// Shared state for one server process.
#[derive(Debug)]
pub struct ServerState {
    stats: Mutex<Statistics>,
    /// `None` when the worker count is unbounded.
    gate: Option<Arc<Semaphore>>,
    max_workers: usize,
}

impl ServerState {
    /// Create state with a global worker cap (0 = unbounded).
    pub fn new(max_workers: usize) -> Self {
        let gate = (max_workers > 0).then(|| Arc::new(Semaphore::new(max_workers)));
        Self {
            stats: Mutex::new(Statistics::default()),
            gate,
            max_workers,
        }
    }

    /// Configured worker cap (0 = unbounded).
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    fn lock(&self) -> MutexGuard<'_, Statistics> {
        // Counters stay meaningful even if a holder panicked.
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent copy of every counter.
    pub fn snapshot(&self) -> Statistics {
        *self.lock()
    }

    pub fn client_connected(&self) {
        self.lock().connected_clients += 1;
        metrics::record_connection_opened();
    }

    pub fn client_disconnected(&self) {
        let mut stats = self.lock();
        stats.connected_clients = stats.connected_clients.saturating_sub(1);
        drop(stats);
        metrics::record_connection_closed();
    }

    /// An expression went through the validation path.
    pub fn expression_checked(&self, valid: bool) {
        let mut stats = self.lock();
        stats.expressions_checked += 1;
        if !valid {
            stats.bad_jobs += 1;
        }
        drop(stats);
        metrics::record_expression_checked(valid);
    }

    pub fn job_completed(&self) {
        self.lock().completed_jobs += 1;
        metrics::record_job(true);
    }

    pub fn job_rejected(&self) {
        self.lock().bad_jobs += 1;
        metrics::record_job(false);
    }

    /// Wait for a worker slot, then count the worker as running.
    ///
    /// Waiters are admitted in the order they asked. The returned permit
    /// must live as long as the worker.
    pub async fn admit_worker(self: &Arc<Self>) -> Result<WorkerPermit, AcquireError> {
        let slot = match &self.gate {
            Some(gate) => Some(Arc::clone(gate).acquire_owned().await?),
            None => None,
        };

        let mut stats = self.lock();
        stats.total_workers_spawned += 1;
        stats.running_workers += 1;
        stats.peak_running_workers = stats.peak_running_workers.max(stats.running_workers);
        drop(stats);
        metrics::record_worker_spawned();

        Ok(WorkerPermit {
            state: Arc::clone(self),
            _slot: slot,
        })
    }

    fn worker_finished(&self) {
        let mut stats = self.lock();
        stats.running_workers = stats.running_workers.saturating_sub(1);
    }
}

/// A running worker's claim on an admission slot.
///
/// The running count is decremented before the slot is released, so the
/// count never exceeds the cap.
#[derive(Debug)]
pub struct WorkerPermit {
    state: Arc<ServerState>,
    _slot: Option<OwnedSemaphorePermit>,
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        self.state.worker_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn counters_track_events() {
        let state = ServerState::new(0);
        state.client_connected();
        state.client_connected();
        state.client_disconnected();
        state.expression_checked(true);
        state.expression_checked(false);
        state.job_completed();

        let stats = state.snapshot();
        assert_eq!(stats.connected_clients, 1);
        assert_eq!(stats.expressions_checked, 2);
        assert_eq!(stats.bad_jobs, 1);
        assert_eq!(stats.completed_jobs, 1);
    }

    #[test]
    fn report_lines_match_operator_format() {
        let stats = Statistics {
            connected_clients: 2,
            expressions_checked: 5,
            completed_jobs: 3,
            bad_jobs: 1,
            total_workers_spawned: 12,
            ..Default::default()
        };
        assert_eq!(
            stats.to_string(),
            "Connected clients:2\nExpressions checked:5\nCompleted jobs:3\nBad jobs:1\nTotal threads:12\n"
        );
    }

    #[tokio::test]
    async fn permits_count_running_workers() {
        let state = Arc::new(ServerState::new(0));
        let a = state.admit_worker().await.unwrap();
        let b = state.admit_worker().await.unwrap();
        assert_eq!(state.snapshot().running_workers, 2);

        drop(a);
        drop(b);
        let stats = state.snapshot();
        assert_eq!(stats.running_workers, 0);
        assert_eq!(stats.total_workers_spawned, 2);
        assert_eq!(stats.peak_running_workers, 2);
    }

    #[tokio::test]
    async fn cap_blocks_until_a_slot_frees() {
        let state = Arc::new(ServerState::new(1));
        let first = state.admit_worker().await.unwrap();

        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.admit_worker().await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        assert_eq!(state.snapshot().running_workers, 1);

        drop(first);
        waiter.await.unwrap().unwrap();
        assert_eq!(state.snapshot().peak_running_workers, 1);
    }
}
