//! Integration server: accept loop, sessions and request handlers.
//!
//! # Data Flow
//! ```text
//! Listener.accept()
//!     → ClientGuard (connected clients +1)
//!     → session.rs (one task per connection, reads heads in a loop)
//!     → handlers.rs (validate | integrate | 400)
//!     → integration::Coordinator (workers under the global cap)
//!     → Response written back on the same connection
//! ```

pub mod handlers;
pub mod session;
pub mod state;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::integration::Coordinator;
use crate::net::{ClientGuard, Listener};
use session::Closed;

pub use state::{ServerState, Statistics, WorkerPermit};

/// Everything a session needs, shared by all sessions.
#[derive(Debug, Clone)]
pub struct AppState {
    pub state: Arc<ServerState>,
    pub coordinator: Coordinator,
    pub max_request_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let state = Arc::new(ServerState::new(config.workers.max_workers));
        Self {
            coordinator: Coordinator::new(Arc::clone(&state), config.workers.max_threads_per_job),
            state,
            max_request_bytes: config.protocol.max_request_bytes,
        }
    }
}

/// The connection acceptor.
pub struct IntegrationServer {
    app: AppState,
}

impl IntegrationServer {
    /// Create a new server with the given configuration.
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            app: AppState::new(config),
        }
    }

    /// Shared counters, for the statistics reporter.
    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.app.state)
    }

    /// Accept connections until `shutdown` fires, one session task each.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %listener.local_addr(),
            max_workers = self.app.state.max_workers(),
            "Integration server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let guard = ClientGuard::new(Arc::clone(&self.app.state));
                            tracing::debug!(connection_id = %guard.id(), peer_addr = %peer, "Session started");
                            let app = self.app.clone();
                            tokio::spawn(async move {
                                let id = guard.id();
                                match session::run(app, stream, guard).await {
                                    Closed::Disconnected => {
                                        tracing::debug!(connection_id = %id, "Client disconnected")
                                    }
                                    Closed::Framing(e) => {
                                        tracing::debug!(connection_id = %id, error = %e, "Dropping session")
                                    }
                                    Closed::Write(e) => {
                                        tracing::warn!(connection_id = %id, error = %e, "Failed to send response")
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Integration server stopping");
                    break;
                }
            }
        }
    }
}
