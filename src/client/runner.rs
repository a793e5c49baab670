//! The per-line job loop.
//!
//! # Per-line flow
//! ```text
//! line → job_line::parse ──error──→ diagnostic, next line
//!            │
//!            ▼
//!        validate ──400──→ bad expression, next line
//!            │
//!            ▼
//!        integrate ──400──→ integration failed, next line
//!            │
//!            ▼
//!        render → stdout
//! ```
//!
//! Diagnostics go to the error writer prefixed with `intclient: `. A
//! communication failure ends the run.

use std::io::{self, Write};

use hyper::StatusCode;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::client::connection::{CommunicationError, ServerConnection};
use crate::client::{job_line, render};

const PREFIX: &str = "intclient";

/// Why a run stopped early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Communication(#[from] CommunicationError),

    #[error("failed to write output: {0}")]
    Output(io::Error),
}

/// What happened to each job line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub answered: usize,
    /// Refused locally or by validation.
    pub rejected: usize,
    /// Validated but the integration came back 400.
    pub failed: usize,
}

/// Feeds job lines to one server connection.
pub struct Runner<O, E> {
    conn: ServerConnection,
    verbose: bool,
    out: O,
    err: E,
}

impl<O: Write, E: Write> Runner<O, E> {
    pub fn new(conn: ServerConnection, verbose: bool, out: O, err: E) -> Self {
        Self {
            conn,
            verbose,
            out,
            err,
        }
    }

    /// Process every line of `input`. Reading stops at end of input or at
    /// the first line that cannot be read.
    pub async fn run<R>(&mut self, input: R) -> Result<RunSummary, RunError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = RunSummary::default();
        let mut lines = input.lines();
        let mut number = 0;

        loop {
            let text = match lines.next_line().await {
                Ok(Some(text)) => text,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, line = number + 1, "Stopped reading jobs");
                    break;
                }
            };
            number += 1;
            self.line(&text, number, &mut summary).await?;
        }

        self.out.flush().map_err(RunError::Output)?;
        Ok(summary)
    }

    async fn line(&mut self, text: &str, number: usize, summary: &mut RunSummary) -> Result<(), RunError> {
        let job = match job_line::parse(text, number) {
            Ok(Some(job)) => job,
            Ok(None) => return Ok(()),
            Err(e) => {
                summary.rejected += 1;
                return self.diagnostic(format_args!("{e}"));
            }
        };

        if !self.conn.validate(&job.expr).await? {
            summary.rejected += 1;
            return self.diagnostic(format_args!("bad expression \"{}\" (line {number})", job.expr));
        }

        let response = self.conn.integrate(&job, self.verbose).await?;
        if response.status != StatusCode::OK {
            summary.failed += 1;
            return self.diagnostic(format_args!("integration failed"));
        }

        let rendered = render::render(&job, &response.body, self.verbose)?;
        self.out.write_all(rendered.as_bytes()).map_err(RunError::Output)?;
        summary.answered += 1;
        Ok(())
    }

    fn diagnostic(&mut self, message: std::fmt::Arguments<'_>) -> Result<(), RunError> {
        writeln!(self.err, "{PREFIX}: {message}").map_err(RunError::Output)
    }

    /// Give back the writers, for inspection.
    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }
}
