//! The unit of work carried by one integrate request.

/// One definite integral to compute.
///
/// The client checks `segments > 0`, `threads > 0`, `threads` dividing
/// `segments`, `lower < upper` and an expression without whitespace before it
/// sends a job. The server re-checks only the expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub expr: String,
    pub lower: f64,
    pub upper: f64,
    pub segments: u32,
    pub threads: u32,
}

impl Job {
    /// Segments each worker samples.
    pub fn segments_per_worker(&self) -> u32 {
        if self.threads == 0 {
            0
        } else {
            self.segments / self.threads
        }
    }
}
