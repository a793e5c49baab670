//! Expression compilation and evaluation.
//!
//! Thin adapter over `meval`. An [`Expression`] is compiled for exactly one
//! free variable and then evaluated at arbitrary points. Compilation is pure
//! (no global state in the library) so workers compile concurrently without
//! a lock.
//!
//! Compiled expressions are deliberately not `Send`: each worker compiles
//! its own handle on the thread that evaluates it.

use thiserror::Error;

/// The only free variable the protocol allows.
pub const VARIABLE: &str = "x";

/// Failure to turn text into an evaluable expression.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The text is not a well-formed expression.
    #[error("syntax error in \"{expr}\": {reason}")]
    Syntax { expr: String, reason: String },

    /// The expression parsed but refers to something other than the variable.
    #[error("cannot bind \"{expr}\" to {var}: {reason}")]
    Unbound {
        expr: String,
        var: String,
        reason: String,
    },
}

/// An expression compiled for a single variable.
pub struct Expression {
    func: Box<dyn Fn(f64) -> f64>,
}

impl Expression {
    /// Compile `source` with `var` as its only free variable.
    pub fn compile(source: &str, var: &str) -> Result<Self, CompileError> {
        let parsed: meval::Expr = source.parse().map_err(|e: meval::Error| CompileError::Syntax {
            expr: source.to_string(),
            reason: e.to_string(),
        })?;

        let func = parsed.bind(var).map_err(|e| CompileError::Unbound {
            expr: source.to_string(),
            var: var.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            func: Box::new(func),
        })
    }

    /// Evaluate at `value`. Domain errors come back as NaN or infinities.
    pub fn eval(&self, value: f64) -> f64 {
        (self.func)(value)
    }
}

impl std::fmt::Debug for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expression").finish_non_exhaustive()
    }
}

/// True if `source` compiles for [`VARIABLE`].
pub fn is_valid(source: &str) -> bool {
    Expression::compile(source, VARIABLE).is_ok()
}
