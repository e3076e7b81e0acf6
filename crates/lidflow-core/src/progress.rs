//! Progress reports and the [`ProgressSink`] callback trait.

use crate::error::ProgressError;

/// Payload delivered to a [`ProgressSink`] on every sampled iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressReport {
    /// Zero-based outer iteration index.
    pub iteration: usize,
    /// Normalized L2 change of `u` over the iteration.
    pub residual_u: f64,
    /// Normalized L2 change of `v` over the iteration.
    pub residual_v: f64,
    /// Seconds since the solve started.
    pub elapsed_time: f64,
}

/// Receives progress reports synchronously from inside a solve.
///
/// # Contract
///
/// - Called on the solving thread, zero or more times per solve.
/// - Must not block for unbounded time.
/// - An `Err` is logged by the solver and otherwise ignored; it never
///   aborts the solve.
///
/// Any `FnMut(&ProgressReport)` closure is a sink:
///
/// ```
/// use lidflow_core::{ProgressReport, ProgressSink};
///
/// let mut seen = Vec::new();
/// let mut sink = |r: &ProgressReport| seen.push(r.iteration);
/// let report = ProgressReport {
///     iteration: 10,
///     residual_u: 0.1,
///     residual_v: 0.2,
///     elapsed_time: 0.5,
/// };
/// sink.report(&report).unwrap();
/// assert_eq!(seen, vec![10]);
/// ```
pub trait ProgressSink {
    /// Deliver one report.
    fn report(&mut self, progress: &ProgressReport) -> Result<(), ProgressError>;
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressReport),
{
    fn report(&mut self, progress: &ProgressReport) -> Result<(), ProgressError> {
        self(progress);
        Ok(())
    }
}
