//! Client side of one server connection.

use std::io;

use hyper::StatusCode;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::integration::Job;
use crate::protocol::{read_head, FramingError, ParseError, Request, Response, ResponseHead};

/// Largest response head the client will buffer.
const MAX_RESPONSE_HEAD: usize = 8192;

/// The server went away or said something unintelligible.
#[derive(Debug, Error)]
pub enum CommunicationError {
    #[error("server closed the connection")]
    Closed,

    #[error("response framing: {0}")]
    Framing(#[from] FramingError),

    #[error("malformed response: {0}")]
    Parse(#[from] ParseError),

    #[error("response body is not UTF-8")]
    Body,

    #[error("unexpected response body {0:?}")]
    Value(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A connection to an integration server, used for one request at a time.
pub struct ServerConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ServerConnection {
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn new(stream: TcpStream) -> Self {
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    /// Send `request` and read the complete response.
    pub async fn send(&mut self, request: &Request) -> Result<Response, CommunicationError> {
        self.writer.write_all(&request.encode()).await?;

        let raw = read_head(&mut self.reader, MAX_RESPONSE_HEAD)
            .await?
            .ok_or(CommunicationError::Closed)?;
        let head = ResponseHead::parse(&raw)?;

        let mut body = vec![0; head.content_length()?];
        self.reader.read_exact(&mut body).await.map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => CommunicationError::Closed,
            _ => CommunicationError::Io(e),
        })?;
        let body = String::from_utf8(body).map_err(|_| CommunicationError::Body)?;

        Ok(head.with_body(body))
    }

    /// Ask whether the server accepts `expr`.
    pub async fn validate(&mut self, expr: &str) -> Result<bool, CommunicationError> {
        let response = self.send(&Request::validate(expr)).await?;
        Ok(response.status == StatusCode::OK)
    }

    /// Submit `job`; the caller inspects the status.
    pub async fn integrate(&mut self, job: &Job, verbose: bool) -> Result<Response, CommunicationError> {
        self.send(&Request::integrate(job, verbose)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reads_body_by_content_length() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            assert_eq!(line, "GET /validate/x*x HTTP/1.1\r\n");
            // Two responses in one write; the client must not over-read.
            write_half
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\n1.000000\n")
                .await
                .unwrap();
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            write_half
        });

        let mut conn = ServerConnection::connect(addr).await.unwrap();
        assert!(conn.validate("x*x").await.unwrap());

        let job = Job {
            expr: "1".into(),
            lower: 0.0,
            upper: 1.0,
            segments: 1,
            threads: 1,
        };
        let response = conn.integrate(&job, false).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "1.000000\n");

        drop(server.await.unwrap());
    }

    #[tokio::test]
    async fn server_hangup_is_a_communication_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let mut conn = ServerConnection::connect(addr).await.unwrap();
        let err = conn.validate("x").await.unwrap_err();
        assert!(
            matches!(
                err,
                CommunicationError::Closed | CommunicationError::Io(_) | CommunicationError::Framing(_)
            ),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn truncated_body_is_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf).await;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 20\r\n\r\n1.0")
                .await
                .unwrap();
        });

        let mut conn = ServerConnection::connect(addr).await.unwrap();
        let err = conn.validate("x").await.unwrap_err();
        assert!(
            matches!(err, CommunicationError::Closed | CommunicationError::Io(_)),
            "{err:?}"
        );
    }
}
