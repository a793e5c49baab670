//! One client connection, serving requests until the client goes away.
//!
//! # States
//! ```text
//! AwaitRequest → Dispatch → AwaitRequest → ...
//!       │
//!       └─ EOF / read error / oversized head → Closed
//! ```
//!
//! # Design Decisions
//! - Requests on one connection are served strictly in order
//! - A head that frames but does not parse gets a 400; the session continues
//! - Closing releases the client count through the guard, on every path

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::net::ClientGuard;
use crate::protocol::{read_head, Request, Response, Route};
use crate::server::{handlers, AppState};

/// Why a session ended.
#[derive(Debug)]
pub enum Closed {
    /// Peer closed the connection between requests.
    Disconnected,
    /// Peer sent something that never formed a complete head.
    Framing(crate::protocol::FramingError),
    /// Writing the response failed.
    Write(std::io::Error),
}

/// Serve `stream` until it closes. The client count is released before
/// this returns.
pub async fn run(app: AppState, stream: TcpStream, guard: ClientGuard) -> Closed {
    let id = guard.id();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let closed = loop {
        let raw = match read_head(&mut reader, app.max_request_bytes).await {
            Ok(Some(raw)) => raw,
            Ok(None) => break Closed::Disconnected,
            Err(e) => break Closed::Framing(e),
        };

        let response = dispatch(&app, &raw).await;

        tracing::debug!(
            connection_id = %id,
            status = response.status.as_u16(),
            "Response ready"
        );

        if let Err(e) = write_half.write_all(&response.encode()).await {
            break Closed::Write(e);
        }
    };

    drop(guard);
    closed
}

/// Route one framed head to its handler.
pub async fn dispatch(app: &AppState, raw: &[u8]) -> Response {
    let request = match Request::parse(raw) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed request");
            return handlers::bad_request(app);
        }
    };

    match request.route() {
        Route::Validate { expr } => handlers::validate(app, &expr),
        Route::Integrate(job) => handlers::integrate(app, &job, request.is_verbose()).await,
        Route::Unrecognized => {
            tracing::debug!(method = %request.method, path = %request.path, "Unrecognized request");
            handlers::bad_request(app)
        }
    }
}
