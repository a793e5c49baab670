//! Splits a job across workers and gathers their results.
//!
//! # Responsibilities
//! - Partition `[lower, upper]` into `threads` equal, increasing sub-intervals
//! - Admit one worker per sub-interval through the global admission gate
//! - Join every worker, sum the partial results
//! - Render the response body (plain or per-worker breakdown)
//!
//! # Design Decisions
//! - Workers run on Tokio's blocking pool; evaluation is CPU-bound
//! - Admission happens in sub-interval order, so a job never starves its
//!   own later workers
//! - Every worker is joined even after a failure; a client that disconnects
//!   mid-job does not cancel anything

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::AcquireError;

use crate::evaluator::CompileError;
use crate::integration::job::Job;
use crate::integration::worker::WorkerTask;
use crate::observability::metrics;
use crate::protocol::format_number;
use crate::server::state::ServerState;

/// Why a job produced no integral.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("job asks for zero workers")]
    NoWorkers,

    #[error("job asks for {requested} workers, limit is {limit}")]
    TooManyWorkers { requested: u32, limit: usize },

    #[error("worker failed to compile expression: {0}")]
    Compile(#[from] CompileError),

    #[error("worker {index} panicked")]
    WorkerPanicked { index: usize },

    #[error("admission gate closed")]
    AdmissionClosed(#[from] AcquireError),
}

/// One worker's contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerReport {
    pub task: WorkerTask,
    pub value: f64,
}

/// A finished integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Integration {
    pub value: f64,
    /// In sub-interval order.
    pub workers: Vec<WorkerReport>,
}

impl Integration {
    /// Response body: optional per-worker lines, then the aggregate line.
    pub fn body(&self, verbose: bool) -> String {
        let mut body = String::new();
        if verbose {
            for report in &self.workers {
                body.push_str(&format!(
                    "thread {}:{}->{}:{}\n",
                    report.task.index + 1,
                    format_number(report.task.lower),
                    format_number(report.task.upper),
                    format_number(report.value)
                ));
            }
        }
        body.push_str(&format_number(self.value));
        body.push('\n');
        body
    }
}

/// Sub-intervals for `job`, in increasing order.
pub fn partition(job: &Job) -> Vec<WorkerTask> {
    let threads = job.threads as usize;
    let step = (job.upper - job.lower) / f64::from(job.threads);
    let segments = job.segments_per_worker();

    (0..threads)
        .map(|index| {
            let upper = if index + 1 == threads {
                job.upper
            } else {
                job.lower + (index + 1) as f64 * step
            };
            WorkerTask {
                index,
                lower: job.lower + index as f64 * step,
                upper,
                segments,
            }
        })
        .collect()
}

/// Runs jobs against a shared admission gate.
#[derive(Debug, Clone)]
pub struct Coordinator {
    state: Arc<ServerState>,
    max_threads_per_job: usize,
}

impl Coordinator {
    pub fn new(state: Arc<ServerState>, max_threads_per_job: usize) -> Self {
        Self {
            state,
            max_threads_per_job,
        }
    }

    /// Integrate `job`, blocking until every worker has finished.
    ///
    /// The worker count comes off the wire, so it is checked against the
    /// per-job limit before anything is allocated for it.
    pub async fn integrate(&self, job: &Job) -> Result<Integration, IntegrationError> {
        if job.threads == 0 {
            return Err(IntegrationError::NoWorkers);
        }
        if job.threads as usize > self.max_threads_per_job {
            return Err(IntegrationError::TooManyWorkers {
                requested: job.threads,
                limit: self.max_threads_per_job,
            });
        }

        let tasks = partition(job);
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let permit = match self.state.admit_worker().await {
                Ok(permit) => permit,
                Err(e) => {
                    // Already-spawned workers keep their permits and finish.
                    tracing::error!(error = %e, "Worker admission failed");
                    return Err(e.into());
                }
            };
            let expr = job.expr.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let started = Instant::now();
                let result = task.run(&expr);
                metrics::record_worker_duration(started.elapsed());
                (task, result)
            }));
        }

        let mut workers = Vec::with_capacity(handles.len());
        let mut failure = None;

        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok((task, Ok(value))) => {
                    tracing::trace!(
                        worker = index + 1,
                        lower = task.lower,
                        upper = task.upper,
                        value,
                        "Worker finished"
                    );
                    workers.push(WorkerReport { task, value });
                }
                Ok((_, Err(e))) => {
                    failure.get_or_insert(IntegrationError::Compile(e));
                }
                Err(e) => {
                    tracing::error!(worker = index + 1, error = %e, "Worker task failed");
                    failure.get_or_insert(IntegrationError::WorkerPanicked { index });
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let value = workers.iter().map(|w| w.value).sum();
        Ok(Integration { value, workers })
    }
}
