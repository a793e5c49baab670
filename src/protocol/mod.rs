//! Wire protocol subsystem.
//!
//! # Data Flow
//! ```text
//! TCP byte stream
//!     → framing.rs (accumulate until a blank line, bounded)
//!     → request.rs (start line + headers → Request → Route)
//!     → [handlers produce a Response]
//!     → response.rs (status line, Content-Length, body)
//!     → TCP byte stream
//! ```
//!
//! # Wire Format
//! ```text
//! GET /validate/<expr> HTTP/1.1
//! GET /integrate/<lower>/<upper>/<segments>/<threads>/<expr> HTTP/1.1
//! X-Verbose: yes            (optional)
//! <blank line>
//!
//! HTTP/1.1 <200 OK | 400 Bad Request>
//! content-length: <n>
//! <blank line>
//! <body>
//! ```
//!
//! # Design Decisions
//! - Only the subset of HTTP/1.1 the service uses; no bodies on requests
//! - Responses always carry Content-Length so the client frames exactly
//! - Numbers are fixed-point with six decimals on both sides

pub mod framing;
pub mod request;
pub mod response;

use thiserror::Error;

pub use framing::{read_head, FramingError};
pub use request::{Request, Route};
pub use response::{Response, ResponseHead};

/// Protocol version written on every start line.
pub const VERSION: &str = "HTTP/1.1";

/// Header whose value `yes` selects the per-worker breakdown.
pub const VERBOSE_HEADER: &str = "x-verbose";

/// Digits after the decimal point for every number on the wire.
pub const DECIMAL_PLACES: usize = 6;

/// A head that was framed correctly but does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("message is not valid UTF-8")]
    Utf8,

    #[error("empty message")]
    Empty,

    #[error("malformed start line: {0:?}")]
    StartLine(String),

    #[error("unsupported protocol version: {0:?}")]
    Version(String),

    #[error("unknown method: {0:?}")]
    Method(String),

    #[error("invalid status code: {0:?}")]
    Status(String),

    #[error("malformed header: {0:?}")]
    Header(String),
}

/// Fixed-point rendering shared by client and server.
pub fn format_number(value: f64) -> String {
    format!("{:.*}", DECIMAL_PLACES, value)
}

/// Split a head into its start line and header lines, dropping line endings
/// and the terminating blank line.
fn split_head(raw: &[u8]) -> Result<(&str, Vec<&str>), ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::Utf8)?;

    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .take_while(|line| !line.is_empty());

    let start = lines.next().ok_or(ParseError::Empty)?;
    Ok((start, lines.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_six_place_fixed_point() {
        assert_eq!(format_number(2.0), "2.000000");
        assert_eq!(format_number(-0.5), "-0.500000");
        assert_eq!(format_number(1e10), "10000000000.000000");
        assert_eq!(format_number(2.0 / 3.0), "0.666667");
    }

    #[test]
    fn split_head_handles_both_line_endings() {
        let (start, headers) = split_head(b"GET / HTTP/1.1\r\nA: b\nC: d\r\n\r\n").unwrap();
        assert_eq!(start, "GET / HTTP/1.1");
        assert_eq!(headers, vec!["A: b", "C: d"]);
    }

    #[test]
    fn split_head_rejects_empty_and_binary() {
        assert_eq!(split_head(b"\r\n"), Err(ParseError::Empty));
        assert_eq!(split_head(&[0xff, 0xfe, b'\n', b'\n']), Err(ParseError::Utf8));
    }
}
