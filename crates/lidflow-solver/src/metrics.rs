//! Per-iteration timing metrics.
//!
//! [`IterationMetrics`] captures wall-clock timing for a single outer
//! iteration, for profiling and progress estimation.

use smallvec::SmallVec;

/// Timing collected during one outer iteration.
///
/// All durations are in microseconds. The solver overwrites these after
/// each `step()`; readers see the most recent iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IterationMetrics {
    /// Wall-clock time for the whole iteration, stages and residuals.
    pub total_us: u64,
    /// Per-stage execution times: `(name, microseconds)`, in pipeline order.
    pub stage_us: SmallVec<[(String, u64); 4]>,
    /// Time spent computing residuals and recording history.
    pub monitor_us: u64,
}

impl IterationMetrics {
    /// Sum of all stage timings.
    pub fn stages_total_us(&self) -> u64 {
        self.stage_us.iter().map(|(_, us)| us).sum()
    }
}
