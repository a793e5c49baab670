//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener
//! - Create the shared state and start the statistics reporter
//! - Start the accept loop
//!
//! # Design Decisions
//! - Fail fast: a bind error is returned before any task is spawned
//! - Signal handling is left to the caller so tests can drive shutdown and
//!   reports directly

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::observability::{StatsReporter, StatsTrigger};
use crate::server::{IntegrationServer, ServerState};

/// Handles to a started server.
pub struct RunningServer {
    /// Port actually bound.
    pub port: u16,
    pub state: Arc<ServerState>,
    pub stats: StatsTrigger,
    pub shutdown: Shutdown,
    server: JoinHandle<()>,
    reporter: JoinHandle<()>,
}

impl RunningServer {
    /// Wait for the accept loop and the reporter to stop.
    pub async fn wait(self) {
        if let Err(e) = self.server.await {
            tracing::error!(error = %e, "Accept loop terminated abnormally");
        }
        if let Err(e) = self.reporter.await {
            tracing::error!(error = %e, "Statistics reporter terminated abnormally");
        }
    }

    /// Stop accepting and wait for background tasks.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.wait().await;
    }
}

/// Bind and start serving according to `config`.
pub async fn start(config: &ServerConfig) -> Result<RunningServer, ListenerError> {
    let listener = Listener::bind(&config.listener).await?;
    Ok(start_with_listener(config, listener, StatsReporter::new))
}

/// Start serving on an already-bound listener. `make_reporter` lets callers
/// redirect statistics output.
pub fn start_with_listener<F>(config: &ServerConfig, listener: Listener, make_reporter: F) -> RunningServer
where
    F: FnOnce(Arc<ServerState>, StatsTrigger) -> StatsReporter,
{
    let port = listener.port();
    let shutdown = Shutdown::new();
    let stats = StatsTrigger::new();

    let server = IntegrationServer::new(config);
    let state = server.state();

    let reporter = make_reporter(Arc::clone(&state), stats.clone());
    let reporter = tokio::spawn(reporter.run(shutdown.subscribe()));
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningServer {
        port,
        state,
        stats,
        shutdown,
        server,
        reporter,
    }
}
