//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use integration_service::config::ServerConfig;
use integration_service::lifecycle::{self, RunningServer};

/// Start a server on an ephemeral loopback port.
#[allow(dead_code)]
pub async fn start_server(max_workers: usize) -> (SocketAddr, RunningServer) {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.workers.max_workers = max_workers;

    let running = lifecycle::start(&config).await.unwrap();
    let addr = SocketAddr::from(([127, 0, 0, 1], running.port));
    (addr, running)
}

/// Write `raw` and read until `expected` responses have fully arrived.
#[allow(dead_code)]
pub async fn raw_exchange(stream: &mut TcpStream, raw: &[u8], expected: usize) -> String {
    stream.write_all(raw).await.unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while complete_responses(&buf) < expected {
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
            .await
            .expect("timed out waiting for response")
            .unwrap();
        assert!(n > 0, "server closed the connection");
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).unwrap()
}

/// Count responses whose bodies have fully arrived.
#[allow(dead_code)]
fn complete_responses(buf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(buf);
    let mut rest: &str = &text;
    let mut count = 0;

    while let Some(end) = rest.find("\r\n\r\n") {
        let head = &rest[..end];
        let length = head
            .lines()
            .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = end + 4;
        if rest.len() < body_start + length {
            break;
        }
        count += 1;
        rest = &rest[body_start + length..];
    }
    count
}

/// Poll `check` until it holds or a few seconds pass.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
