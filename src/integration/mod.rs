//! Parallel trapezoidal integration.
//!
//! # Data Flow
//! ```text
//! Job (expr, lower, upper, segments, threads)
//!     → coordinator.rs (partition into `threads` sub-intervals)
//!     → admission gate (server::state, global cap)
//!     → worker.rs (compile + trapezoid sum, one blocking task each)
//!     → coordinator.rs (join all, sum, render body)
//! ```

pub mod coordinator;
pub mod job;
pub mod worker;

pub use coordinator::{Coordinator, Integration, IntegrationError, WorkerReport};
pub use job::Job;
pub use worker::{trapezoid, WorkerTask};
