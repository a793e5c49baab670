//! Message boundary detection over a byte stream.
//!
//! A message head is a run of lines ending with an empty line. Both `\r\n`
//! and bare `\n` line endings are accepted. The head is bounded: a peer that
//! never sends the terminator cannot grow the buffer past the limit.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Failure to find a complete message head.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The stream ended part-way through a head.
    #[error("stream closed after {0} bytes without a blank line")]
    Truncated(usize),

    /// No terminator within the configured limit.
    #[error("message head exceeds {0} bytes")]
    TooLarge(usize),

    /// Underlying read failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

fn is_blank_line(line: &[u8]) -> bool {
    line == b"\n" || line == b"\r\n"
}

/// Read one message head, including its terminating blank line.
///
/// Returns `Ok(None)` when the stream is closed cleanly between messages.
/// Blank lines before a head are skipped.
pub async fn read_head<R>(reader: &mut R, limit: usize) -> Result<Option<Vec<u8>>, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    loop {
        let remaining = limit.saturating_sub(buf.len());
        if remaining == 0 {
            return Err(FramingError::TooLarge(limit));
        }

        let start = buf.len();
        let n = (&mut *reader)
            .take(remaining as u64)
            .read_until(b'\n', &mut buf)
            .await?;

        if n == 0 {
            return if buf.is_empty() {
                Ok(None)
            } else {
                Err(FramingError::Truncated(buf.len()))
            };
        }

        if buf.last() != Some(&b'\n') {
            if buf.len() >= limit {
                return Err(FramingError::TooLarge(limit));
            }
            return Err(FramingError::Truncated(buf.len()));
        }

        if is_blank_line(&buf[start..]) {
            if start == 0 {
                buf.clear();
                continue;
            }
            return Ok(Some(buf));
        }
    }
}
