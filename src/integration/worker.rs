//! A single worker's share of an integration job.

use crate::evaluator::{CompileError, Expression, VARIABLE};

/// One contiguous sub-interval assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerTask {
    /// Zero-based position of the sub-interval within the job.
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    /// Trapezoids to sum over `[lower, upper]`.
    pub segments: u32,
}

impl WorkerTask {
    /// Compile `expr` and integrate it over this sub-interval.
    ///
    /// Runs on a blocking thread; the compiled expression never leaves it.
    pub fn run(&self, expr: &str) -> Result<f64, CompileError> {
        let expression = Expression::compile(expr, VARIABLE)?;
        Ok(trapezoid(
            |x| expression.eval(x),
            self.lower,
            self.upper,
            self.segments,
        ))
    }
}

/// Trapezoidal estimate of the integral of `f` over `[a, b]` with `n`
/// equal-width segments.
///
/// Samples are taken at `a + i * step` for `i` in `0..=n` rather than by
/// accumulating `step`, so rounding does not drift across long runs. A segment
/// whose left or right sample is NaN contributes nothing; a NaN sample never
/// leaks into later segments.
pub fn trapezoid<F>(f: F, a: f64, b: f64, n: u32) -> f64
where
    F: Fn(f64) -> f64,
{
    if n == 0 {
        return 0.0;
    }

    let step = (b - a) / f64::from(n);
    let mut sum = 0.0;
    let mut previous = f(a);

    for i in 1..=n {
        let current = f(a + f64::from(i) * step);
        if !current.is_nan() && !previous.is_nan() {
            sum += (current + previous) * step / 2.0;
        }
        previous = current;
    }

    sum
}
