//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop)
//!     → connection.rs (connection ID, connected-clients accounting)
//!     → Hand off to a server session
//! ```

pub mod connection;
pub mod listener;

pub use connection::{ClientGuard, ConnectionId};
pub use listener::{Listener, ListenerError};
