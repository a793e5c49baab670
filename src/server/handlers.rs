//! Validation and integration handlers.
//!
//! Each handler turns one routed request into one response and updates the
//! shared counters. Malformed and unrecognized requests go through the
//! validation path so they are counted the same way as a bad expression.

use hyper::StatusCode;
use uuid::Uuid;

use crate::evaluator;
use crate::integration::Job;
use crate::protocol::{format_number, Response};
use crate::server::AppState;

/// Compile `expr` only; 200 if it compiles, 400 otherwise.
pub fn validate(app: &AppState, expr: &str) -> Response {
    let valid = evaluator::is_valid(expr);
    app.state.expression_checked(valid);

    tracing::debug!(expr = %expr, valid, "Expression checked");

    if valid {
        Response::ok(String::new())
    } else {
        Response::bad_request()
    }
}

/// Uniform answer for a request that could not be parsed or routed.
pub fn bad_request(app: &AppState) -> Response {
    app.state.expression_checked(false);
    Response::bad_request()
}

/// Run `job` and answer with the aggregate (and breakdown if `verbose`).
pub async fn integrate(app: &AppState, job: &Job, verbose: bool) -> Response {
    let request_id = Uuid::new_v4();

    tracing::debug!(
        request_id = %request_id,
        expr = %job.expr,
        lower = job.lower,
        upper = job.upper,
        segments = job.segments,
        threads = job.threads,
        verbose,
        "Integration started"
    );

    match app.coordinator.integrate(job).await {
        Ok(result) => {
            app.state.job_completed();
            tracing::info!(
                request_id = %request_id,
                expr = %job.expr,
                value = result.value,
                "Integration completed"
            );
            Response::ok(result.body(verbose))
        }
        Err(e) => {
            app.state.job_rejected();
            tracing::warn!(request_id = %request_id, expr = %job.expr, error = %e, "Integration rejected");
            Response::new(StatusCode::BAD_REQUEST, format!("{}\n", format_number(0.0)))
        }
    }
}
