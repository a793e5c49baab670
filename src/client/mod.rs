//! Integration client.
//!
//! # Data Flow
//! ```text
//! job file / stdin
//!     → runner.rs (line loop)
//!     → job_line.rs (fields + local checks)
//!     → connection.rs (validate, then integrate)
//!     → render.rs (plain or verbose output)
//! ```

pub mod connection;
pub mod job_line;
pub mod render;
pub mod runner;

pub use connection::{CommunicationError, ServerConnection};
pub use job_line::JobLineError;
pub use runner::{RunError, RunSummary, Runner};
