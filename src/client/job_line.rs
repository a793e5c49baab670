//! Job file lines: `expr,lower,upper,segments,threads`.
//!
//! Parsing happens in two passes. The syntax pass splits the line and rejects
//! anything that is not five non-empty fields of plausible numbers. The local
//! check pass then enforces the job invariants, in a fixed order, so that the
//! first violated rule is the one reported.

use thiserror::Error;

use crate::integration::Job;

/// A line the client refuses to send. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobLineError {
    #[error("syntax error on line {line}")]
    Syntax { line: usize },

    #[error("spaces not permitted in expression (line {line})")]
    SpaceInExpression { line: usize },

    #[error("upper bound must be greater than lower bound (line {line})")]
    Bounds { line: usize },

    #[error("segments must be a positive integer (line {line})")]
    Segments { line: usize },

    #[error("threads must be a positive integer (line {line})")]
    Threads { line: usize },

    #[error("segments must be an integer multiple of threads (line {line})")]
    NotMultiple { line: usize },
}

/// Blank, whitespace-only and `#` lines carry no job.
pub fn is_skippable(text: &str) -> bool {
    text.trim().is_empty() || text.starts_with('#')
}

/// Parse one job line. Returns `Ok(None)` for lines that are skipped.
pub fn parse(text: &str, line: usize) -> Result<Option<Job>, JobLineError> {
    if is_skippable(text) {
        return Ok(None);
    }

    let syntax = JobLineError::Syntax { line };

    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 5 || fields.iter().any(|f| f.is_empty()) {
        return Err(syntax);
    }

    let expr = fields[0];
    let lower = number(fields[1], true).ok_or(syntax.clone())?;
    let upper = number(fields[2], true).ok_or(syntax.clone())?;
    let segments = number(fields[3], false).ok_or(syntax.clone())?;
    let threads = number(fields[4], false).ok_or(syntax.clone())?;

    let limit = f64::from(i32::MAX);
    if segments > limit || threads > limit {
        return Err(syntax);
    }

    if expr.chars().any(char::is_whitespace) {
        return Err(JobLineError::SpaceInExpression { line });
    }
    if lower >= upper {
        return Err(JobLineError::Bounds { line });
    }
    if segments.fract() != 0.0 || segments <= 0.0 {
        return Err(JobLineError::Segments { line });
    }
    if threads.fract() != 0.0 || threads <= 0.0 {
        return Err(JobLineError::Threads { line });
    }
    if (segments / threads).fract() != 0.0 {
        return Err(JobLineError::NotMultiple { line });
    }

    // Both are whole numbers in 1..=i32::MAX at this point.
    Ok(Some(Job {
        expr: expr.to_string(),
        lower,
        upper,
        segments: segments as u32,
        threads: threads as u32,
    }))
}

/// Digits, `-` and `e`, plus `.` when `decimal` is set.
fn number(field: &str, decimal: bool) -> Option<f64> {
    let allowed = |c: char| c.is_ascii_digit() || c == '-' || c == 'e' || (decimal && c == '.');
    if !field.chars().all(allowed) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let job = parse("x*x,0,2,100,4", 1).unwrap().unwrap();
        assert_eq!(
            job,
            Job {
                expr: "x*x".into(),
                lower: 0.0,
                upper: 2.0,
                segments: 100,
                threads: 4,
            }
        );
    }

    #[test]
    fn accepts_exponents_and_negative_bounds() {
        let job = parse("sin(x),-1.5,2e1,1e3,10", 3).unwrap().unwrap();
        assert_eq!(job.lower, -1.5);
        assert_eq!(job.upper, 20.0);
        assert_eq!(job.segments, 1000);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse("", 1), Ok(None));
        assert_eq!(parse("   \t", 2), Ok(None));
        assert_eq!(parse("# x,0,1,1,1", 3), Ok(None));
    }

    #[test]
    fn syntax_errors() {
        for bad in [
            "x,0,1,10",
            "x,0,1,10,1,1",
            ",0,1,10,1",
            "x,0,,10,1",
            "x,zero,1,10,1",
            "x,0,1,10.0,1",
            "x,0,1,10,1.5",
            "x,0,1,--,1",
            "x,0,1,3000000000,1",
        ] {
            assert_eq!(parse(bad, 7), Err(JobLineError::Syntax { line: 7 }), "{bad}");
        }
    }

    #[test]
    fn local_checks_in_order() {
        assert_eq!(
            parse("x + 1,2,1,10,3", 1),
            Err(JobLineError::SpaceInExpression { line: 1 })
        );
        assert_eq!(parse("x,2,1,10,3", 2), Err(JobLineError::Bounds { line: 2 }));
        assert_eq!(parse("x,1,1,10,3", 2), Err(JobLineError::Bounds { line: 2 }));
        assert_eq!(parse("x,0,1,-10,3", 3), Err(JobLineError::Segments { line: 3 }));
        assert_eq!(parse("x,0,1,1e-1,3", 3), Err(JobLineError::Segments { line: 3 }));
        assert_eq!(parse("x,0,1,10,0", 4), Err(JobLineError::Threads { line: 4 }));
        assert_eq!(parse("x,0,1,10,3", 5), Err(JobLineError::NotMultiple { line: 5 }));
    }

    #[test]
    fn messages_name_the_line() {
        assert_eq!(
            JobLineError::NotMultiple { line: 12 }.to_string(),
            "segments must be an integer multiple of threads (line 12)"
        );
        assert_eq!(JobLineError::Syntax { line: 4 }.to_string(), "syntax error on line 4");
    }
}
