//! Convergence history records and the final [`SolveResult`].

use crate::field::Field2;

/// One sampled point of the convergence history.
///
/// Appended every [`SAMPLE_INTERVAL`](crate::constants::SAMPLE_INTERVAL)
/// iterations and never modified afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergenceRecord {
    /// Zero-based outer iteration index.
    pub iteration: usize,
    /// Normalized L2 residual of `u`.
    pub residual_u: f64,
    /// Normalized L2 residual of `v`.
    pub residual_v: f64,
    /// Seconds since the solve started.
    pub elapsed_time: f64,
}

/// Residuals of the two velocity components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResidualPair {
    /// Residual of `u`.
    pub u: f64,
    /// Residual of `v`.
    pub v: f64,
}

impl ResidualPair {
    /// Returns `true` if both residuals are strictly below `tolerance`.
    ///
    /// NaN residuals never satisfy the tolerance.
    pub fn below(&self, tolerance: f64) -> bool {
        self.u < tolerance && self.v < tolerance
    }
}

/// Everything a finished solve produces.
///
/// Built exactly once by the solver at loop exit, whether by convergence
/// or by exhausting the iteration budget, and handed to the caller by value.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveResult {
    /// Cell-centred pressure, shape `(ny, nx)`.
    pub pressure: Field2,
    /// Horizontal velocity on vertical faces, shape `(ny, nx - 1)`.
    pub velocity_u: Field2,
    /// Vertical velocity on horizontal faces, shape `(ny - 1, nx)`.
    pub velocity_v: Field2,
    /// `nx` evenly spaced samples over `[0, L]`.
    pub x_coords: Vec<f64>,
    /// `ny` evenly spaced samples over `[0, L]`.
    pub y_coords: Vec<f64>,
    /// Sampled history in iteration order.
    pub convergence_history: Vec<ConvergenceRecord>,
    /// Residuals of the last executed iteration.
    pub final_residuals: ResidualPair,
    /// Number of outer iterations executed.
    pub total_iterations: usize,
    /// Wall time of the whole solve in seconds.
    pub elapsed_time: f64,
    /// `true` if both residuals fell below the tolerance.
    pub converged: bool,
}
