//! Turning an integrate response into the lines the user sees.

use crate::client::connection::CommunicationError;
use crate::integration::Job;
use crate::protocol::format_number;

/// Render a successful integrate response body.
///
/// Plain bodies carry only the aggregate. Verbose bodies carry one line per
/// worker, printed as received, followed by the aggregate.
pub fn render(job: &Job, body: &str, verbose: bool) -> Result<String, CommunicationError> {
    let mut out = String::new();
    let mut lines = body.split_inclusive('\n');

    if verbose {
        for _ in 0..job.threads {
            let line = lines
                .next()
                .ok_or_else(|| CommunicationError::Value(body.to_string()))?;
            out.push_str(line);
        }
    }

    let value = lines
        .next()
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| CommunicationError::Value(body.to_string()))?;

    out.push_str(&summary(job, value));
    Ok(out)
}

/// `The integral of <expr> from <lower> to <upper> is <value>`.
pub fn summary(job: &Job, value: f64) -> String {
    format!(
        "The integral of {} from {} to {} is {}\n",
        job.expr,
        format_number(job.lower),
        format_number(job.upper),
        format_number(value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(threads: u32) -> Job {
        Job {
            expr: "x*x".into(),
            lower: 0.0,
            upper: 2.0,
            segments: 100,
            threads,
        }
    }

    #[test]
    fn plain_summary() {
        let out = render(&job(1), "2.666800\n", false).unwrap();
        assert_eq!(out, "The integral of x*x from 0.000000 to 2.000000 is 2.666800\n");
    }

    #[test]
    fn verbose_keeps_worker_lines() {
        let body = "thread 1:0.000000->1.000000:0.333350\nthread 2:1.000000->2.000000:2.333450\n2.666800\n";
        let out = render(&job(2), body, true).unwrap();
        assert_eq!(
            out,
            "thread 1:0.000000->1.000000:0.333350\n\
             thread 2:1.000000->2.000000:2.333450\n\
             The integral of x*x from 0.000000 to 2.000000 is 2.666800\n"
        );
    }

    #[test]
    fn short_or_garbled_body_is_rejected() {
        assert!(render(&job(2), "thread 1:0->1:0.3\n", true).is_err());
        assert!(render(&job(1), "nope\n", false).is_err());
        assert!(render(&job(1), "", false).is_err());
    }
}
