//! Request envelope: parse on the server, construct on the client.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::Method;

use crate::integration::Job;
use crate::protocol::{format_number, split_head, ParseError, VERBOSE_HEADER, VERSION};

const VALIDATE_PREFIX: &str = "/validate/";
const INTEGRATE_PREFIX: &str = "/integrate/";

/// A parsed request head. The protocol carries no request bodies.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
}

/// What a request asks the server to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Validate { expr: String },
    Integrate(Job),
    Unrecognized,
}

impl Request {
    /// Parse a complete head as produced by [`crate::protocol::read_head`].
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let (start, header_lines) = split_head(raw)?;

        let mut parts = start.split(' ');
        let (method, path, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(p), Some(v), None) if !m.is_empty() && !p.is_empty() => (m, p, v),
            _ => return Err(ParseError::StartLine(start.to_string())),
        };

        if !version.starts_with("HTTP/") {
            return Err(ParseError::Version(version.to_string()));
        }

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ParseError::Method(method.to_string()))?;

        let headers = parse_headers(&header_lines)?;

        Ok(Self {
            method,
            path: path.to_string(),
            headers,
        })
    }

    /// Build a validation request for `expr`.
    pub fn validate(expr: &str) -> Self {
        Self {
            method: Method::GET,
            path: format!("{VALIDATE_PREFIX}{expr}"),
            headers: HeaderMap::new(),
        }
    }

    /// Build an integration request for `job`.
    pub fn integrate(job: &Job, verbose: bool) -> Self {
        let mut headers = HeaderMap::new();
        if verbose {
            headers.insert(VERBOSE_HEADER, HeaderValue::from_static("yes"));
        }

        Self {
            method: Method::GET,
            path: format!(
                "{INTEGRATE_PREFIX}{}/{}/{}/{}/{}",
                format_number(job.lower),
                format_number(job.upper),
                job.segments,
                job.threads,
                job.expr
            ),
            headers,
        }
    }

    /// True when the client asked for the per-worker breakdown.
    pub fn is_verbose(&self) -> bool {
        self.headers
            .get(VERBOSE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"))
    }

    /// Map method and path onto an operation.
    pub fn route(&self) -> Route {
        if self.method != Method::GET {
            return Route::Unrecognized;
        }

        if let Some(expr) = self.path.strip_prefix(VALIDATE_PREFIX) {
            return Route::Validate {
                expr: expr.to_string(),
            };
        }

        if let Some(rest) = self.path.strip_prefix(INTEGRATE_PREFIX) {
            return Route::Integrate(job_from_path(rest));
        }

        Route::Unrecognized
    }

    /// Serialize the head, terminated by a blank line.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = format!("{} {} {}\r\n", self.method, self.path, VERSION);
        for (name, value) in &self.headers {
            out.push_str(name.as_str());
            out.push_str(": ");
            out.push_str(value.to_str().unwrap_or_default());
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.into_bytes()
    }
}

/// Fields after `/integrate/`: lower, upper, segments, threads, expression.
/// Missing or malformed numbers read as zero; the expression keeps any `/`.
fn job_from_path(rest: &str) -> Job {
    let mut fields = rest.splitn(5, '/');
    let mut next = || fields.next().unwrap_or_default();

    let lower = next().parse().unwrap_or(0.0);
    let upper = next().parse().unwrap_or(0.0);
    let segments = next().parse().unwrap_or(0);
    let threads = next().parse().unwrap_or(0);
    let expr = next().to_string();

    Job {
        expr,
        lower,
        upper,
        segments,
        threads,
    }
}

pub(crate) fn parse_headers(lines: &[&str]) -> Result<HeaderMap, ParseError> {
    let mut headers = HeaderMap::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::Header(line.to_string()))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| ParseError::Header(line.to_string()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ParseError::Header(line.to_string()))?;
        headers.append(name, value);
    }
    Ok(headers)
}
