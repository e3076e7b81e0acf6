//! Physical and numerical constants shared by the solver and its callers.

/// Fluid density. The cavity problem is posed for a unit-density fluid.
pub const DENSITY: f64 = 1.0;

/// Side length of the square cavity.
pub const CAVITY_LENGTH: f64 = 1.0;

/// Guard added to the residual denominator so a zero field never divides by zero.
pub const RESIDUAL_EPSILON: f64 = 1e-12;

/// Pressure-correction central coefficients at or below this are skipped.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Gauss-Seidel sweeps applied to the pressure-correction system per outer iteration.
pub const PRESSURE_SWEEPS: usize = 50;

/// A convergence record is appended every `SAMPLE_INTERVAL` outer iterations.
pub const SAMPLE_INTERVAL: usize = 10;

/// Default node count in each direction.
pub const DEFAULT_GRID_SIZE: usize = 41;

/// Smallest node count per direction for which the staggered layout has
/// at least one interior pressure cell.
pub const MIN_GRID_NODES: usize = 3;
