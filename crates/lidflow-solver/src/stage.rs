//! The [`Stage`] trait and the per-solve [`StageContext`].
//!
//! Stages are stateless operators executed in sequence each outer
//! iteration. All state they exchange lives in the [`StaggeredGrid`];
//! the context carries the constants derived once from the parameters.

use lidflow_core::constants::{DENSITY, PIVOT_EPSILON, PRESSURE_SWEEPS};
use lidflow_core::{CoefficientMode, SimulationParameters, StageError};

use crate::grid::StaggeredGrid;

/// Solve-wide constants handed to every stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageContext {
    /// Fluid density.
    pub density: f64,
    /// Dynamic viscosity.
    pub viscosity: f64,
    /// Velocity under-relaxation factor.
    pub alpha_u: f64,
    /// Pressure relaxation factor.
    pub alpha_p: f64,
    /// Lid velocity applied to the top row of `u`.
    pub lid_velocity: f64,
    /// Per-face or legacy scalar momentum coefficients.
    pub coefficient_mode: CoefficientMode,
    /// Gauss-Seidel sweeps per pressure-correction solve.
    pub pressure_sweeps: usize,
    /// Central coefficients at or below this are skipped during relaxation.
    pub pivot_epsilon: f64,
}

impl StageContext {
    /// Derive the context from simulation parameters.
    pub fn from_params(params: &SimulationParameters) -> Self {
        Self {
            density: DENSITY,
            viscosity: params.viscosity(),
            alpha_u: params.alpha_u,
            alpha_p: params.alpha_p,
            lid_velocity: params.lid_velocity,
            coefficient_mode: params.coefficient_mode,
            pressure_sweeps: PRESSURE_SWEEPS,
            pivot_epsilon: PIVOT_EPSILON,
        }
    }
}

/// One step of the SIMPLEC outer iteration.
///
/// # Contract
///
/// - `apply()` MUST be deterministic: the same grid and context produce
///   identical output.
/// - `&self`: stages are stateless; everything they produce goes into
///   the grid.
/// - A stage must not change the shape of any grid array. The solver
///   checks shapes after every stage and fails the solve otherwise.
///
/// # Object safety
///
/// This trait is object-safe; the solver stores its pipeline as
/// `Vec<Box<dyn Stage>>`.
///
/// # Examples
///
/// A stage that damps the pressure field:
///
/// ```
/// use lidflow_core::StageError;
/// use lidflow_solver::{Stage, StageContext, StaggeredGrid};
///
/// struct DampPressure(f64);
///
/// impl Stage for DampPressure {
///     fn name(&self) -> &str { "damp_pressure" }
///
///     fn apply(&self, grid: &mut StaggeredGrid, _ctx: &StageContext) -> Result<(), StageError> {
///         for p in grid.p_mut().as_mut_slice() {
///             *p *= self.0;
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(DampPressure(0.5).name(), "damp_pressure");
/// ```
pub trait Stage: Send + 'static {
    /// Human-readable name for error reporting and metrics.
    fn name(&self) -> &str;

    /// Run the stage once over the whole grid.
    fn apply(&self, grid: &mut StaggeredGrid, ctx: &StageContext) -> Result<(), StageError>;
}
