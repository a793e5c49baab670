//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Operator asks (SIGHUP):
//!     → stats.rs (snapshot of server counters → stderr + log)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Connection and request IDs flow through session logs
//! - Metrics are cheap (no-op without an installed recorder)
//! - The statistics reporter is idle between triggers

pub mod logging;
pub mod metrics;
pub mod stats;

pub use stats::{StatsReporter, StatsTrigger};
