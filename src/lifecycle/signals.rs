//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGHUP, SIGTERM, SIGINT)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP asks for a statistics report, not a reload
//! - SIGTERM/SIGINT stop the accept loop

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;
use crate::observability::StatsTrigger;

/// Spawn the task that turns signals into stats reports and shutdown.
#[cfg(unix)]
pub fn spawn_signal_handler(
    stats: StatsTrigger,
    shutdown: Shutdown,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(()) = hangup.recv() => {
                    tracing::debug!("SIGHUP received, reporting statistics");
                    stats.fire();
                }
                _ = terminate.recv() => {
                    tracing::info!("SIGTERM received");
                    break;
                }
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    } else {
                        tracing::info!("SIGINT received");
                    }
                    break;
                }
            }
        }
        shutdown.trigger();
    }))
}

/// Spawn the task that turns Ctrl+C into shutdown.
#[cfg(not(unix))]
pub fn spawn_signal_handler(
    _stats: StatsTrigger,
    shutdown: Shutdown,
) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
        shutdown.trigger();
    }))
}
