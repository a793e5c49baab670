//! On-demand statistics report.
//!
//! The reporter sleeps on a [`Notify`] until an operator asks for a report
//! (SIGHUP, see `lifecycle::signals`), writes the counters, and goes back to
//! sleep. Triggers that arrive while a report is being written coalesce into
//! one more report.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::{broadcast, Notify};

use crate::server::state::{ServerState, Statistics};

/// Handle used to request a report. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct StatsTrigger {
    notify: Arc<Notify>,
}

impl StatsTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for one report. Never blocks.
    pub fn fire(&self) {
        self.notify.notify_one();
    }
}

/// Background task printing the server counters on demand.
pub struct StatsReporter {
    state: Arc<ServerState>,
    trigger: StatsTrigger,
    out: Box<dyn Write + Send>,
}

impl StatsReporter {
    /// Reporter writing to stderr.
    pub fn new(state: Arc<ServerState>, trigger: StatsTrigger) -> Self {
        Self {
            state,
            trigger,
            out: Box::new(std::io::stderr()),
        }
    }

    /// Send reports somewhere other than stderr.
    pub fn with_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Write one report now and return what was written.
    pub fn report(&mut self) -> Statistics {
        let stats = self.state.snapshot();

        if let Err(e) = write!(self.out, "{stats}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write statistics report");
        }

        tracing::info!(
            connected_clients = stats.connected_clients,
            expressions_checked = stats.expressions_checked,
            completed_jobs = stats.completed_jobs,
            bad_jobs = stats.bad_jobs,
            total_workers = stats.total_workers_spawned,
            running_workers = stats.running_workers,
            "Statistics report"
        );

        stats
    }

    /// Report on every trigger until shutdown.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let notify = Arc::clone(&self.trigger.notify);
        loop {
            tokio::select! {
                _ = notify.notified() => {
                    self.report();
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Statistics reporter stopping");
                    break;
                }
            }
        }
    }
}
