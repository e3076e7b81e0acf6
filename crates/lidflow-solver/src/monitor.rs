//! Residual computation, history sampling and the stop decision.

use std::time::Instant;

use lidflow_core::constants::{RESIDUAL_EPSILON, SAMPLE_INTERVAL};
use lidflow_core::{ConvergenceRecord, Field2, ProgressReport, ProgressSink, ResidualPair};

/// Normalized L2 change `||new - old|| / (||old|| + 1e-12)`.
///
/// Finite for an all-zero `old`.
pub fn residual(new: &Field2, old: &Field2) -> f64 {
    new.l2_distance(old) / (old.l2_norm() + RESIDUAL_EPSILON)
}

/// What the solver should do after an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Run another iteration.
    Continue,
    /// Both residuals are below the tolerance.
    Converged,
    /// The iteration budget is used up without converging.
    Exhausted,
}

/// Tracks residuals over a solve.
///
/// Every [`SAMPLE_INTERVAL`]-th iteration (0-indexed) appends a
/// [`ConvergenceRecord`] and forwards the same numbers to the progress
/// sink. Sink failures are logged and dropped.
#[derive(Debug)]
pub struct ConvergenceMonitor {
    tolerance: f64,
    max_iter: usize,
    started: Instant,
    history: Vec<ConvergenceRecord>,
}

impl ConvergenceMonitor {
    /// Start the clock for a solve with the given stop criteria.
    pub fn new(tolerance: f64, max_iter: usize) -> Self {
        Self {
            tolerance,
            max_iter,
            started: Instant::now(),
            history: Vec::new(),
        }
    }

    /// Seconds since the monitor was created.
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Sampled history so far.
    pub fn history(&self) -> &[ConvergenceRecord] {
        &self.history
    }

    /// Consume the monitor, keeping the history.
    pub fn into_history(self) -> Vec<ConvergenceRecord> {
        self.history
    }

    /// Record the residuals of `iteration` and decide whether to stop.
    pub fn observe(
        &mut self,
        iteration: usize,
        residuals: ResidualPair,
        sink: &mut dyn ProgressSink,
    ) -> Verdict {
        if iteration % SAMPLE_INTERVAL == 0 {
            let record = ConvergenceRecord {
                iteration,
                residual_u: residuals.u,
                residual_v: residuals.v,
                elapsed_time: self.elapsed(),
            };
            tracing::debug!(
                iteration,
                residual_u = record.residual_u,
                residual_v = record.residual_v,
                "convergence sample"
            );
            self.history.push(record);

            let report = ProgressReport {
                iteration: record.iteration,
                residual_u: record.residual_u,
                residual_v: record.residual_v,
                elapsed_time: record.elapsed_time,
            };
            if let Err(e) = sink.report(&report) {
                tracing::warn!(iteration, error = %e, "progress sink failed");
            }
        }

        if residuals.below(self.tolerance) {
            Verdict::Converged
        } else if iteration + 1 >= self.max_iter {
            Verdict::Exhausted
        } else {
            Verdict::Continue
        }
    }
}
