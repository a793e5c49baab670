//! Connection identity and lifetime accounting.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Keep the connected-clients counter exact for every exit path

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::server::state::ServerState;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts one connected client for as long as it lives.
#[derive(Debug)]
pub struct ClientGuard {
    state: Arc<ServerState>,
    id: ConnectionId,
}

impl ClientGuard {
    /// Record a newly accepted client.
    pub fn new(state: Arc<ServerState>) -> Self {
        state.client_connected();
        Self {
            state,
            id: ConnectionId::new(),
        }
    }

    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.state.client_disconnected();
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
