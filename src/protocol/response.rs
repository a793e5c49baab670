//! Response envelope: construct on the server, parse on the client.

use hyper::header::{HeaderMap, CONTENT_LENGTH};
use hyper::StatusCode;

use crate::protocol::request::parse_headers;
use crate::protocol::{split_head, ParseError, VERSION};

/// A response with its body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    /// Build a response; `Content-Length` is filled in on encode.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, String::new())
    }

    /// Serialize status line, headers, blank line and body.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = format!(
            "{} {} {}\r\n",
            VERSION,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        for (name, value) in &self.headers {
            if name == CONTENT_LENGTH {
                continue;
            }
            out.push_str(name.as_str());
            out.push_str(": ");
            out.push_str(value.to_str().unwrap_or_default());
            out.push_str("\r\n");
        }
        out.push_str(&format!("{}: {}\r\n\r\n", CONTENT_LENGTH, self.body.len()));
        out.push_str(&self.body);
        out.into_bytes()
    }
}

/// Status line and headers of a response, before the body is read.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub reason: String,
    pub headers: HeaderMap,
}

impl ResponseHead {
    /// Parse a complete head as produced by [`crate::protocol::read_head`].
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let (start, header_lines) = split_head(raw)?;

        let mut parts = start.splitn(3, ' ');
        let (version, code) = match (parts.next(), parts.next()) {
            (Some(v), Some(c)) => (v, c),
            _ => return Err(ParseError::StartLine(start.to_string())),
        };
        let reason = parts.next().unwrap_or_default().to_string();

        if !version.starts_with("HTTP/") {
            return Err(ParseError::Version(version.to_string()));
        }

        let status = code
            .parse::<u16>()
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .ok_or_else(|| ParseError::Status(code.to_string()))?;

        let headers = parse_headers(&header_lines)?;

        Ok(Self {
            status,
            reason,
            headers,
        })
    }

    /// Declared body length; absent means no body.
    pub fn content_length(&self) -> Result<usize, ParseError> {
        match self.headers.get(CONTENT_LENGTH) {
            None => Ok(0),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| ParseError::Header(format!("{:?}", value))),
        }
    }

    /// Attach a body read off the wire.
    pub fn with_body(self, body: String) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body,
        }
    }
}
