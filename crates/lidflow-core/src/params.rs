//! Simulation parameters and the momentum-coefficient mode.

use crate::constants::{CAVITY_LENGTH, DEFAULT_GRID_SIZE, DENSITY};

/// How the momentum central coefficient `a_P` feeds the SIMPLEC d-factor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CoefficientMode {
    /// One `a_P` per solved velocity face, indexed like the velocity arrays.
    ///
    /// Wall faces are never solved and carry `d = 0`, which gives the
    /// pressure correction a zero-gradient condition at the walls.
    #[default]
    PerFace,
    /// The `a_P` of the last face visited by each momentum sweep is reused
    /// for every face, walls included.
    ///
    /// Reproduces the reference Python solver output; physically inconsistent.
    LegacyScalar,
}

/// Immutable input record for one cavity solve.
///
/// The core assumes every field is within range; range checks belong to
/// the caller (see `lidflow_engine::ParameterLimits`). The cavity is the
/// unit square and the density is fixed at [`DENSITY`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    /// Reynolds number, `> 0`.
    pub reynolds_number: f64,
    /// Pressure node count along x.
    pub nx: usize,
    /// Pressure node count along y.
    pub ny: usize,
    /// Velocity under-relaxation factor in `(0, 1]`.
    pub alpha_u: f64,
    /// Pressure relaxation factor in `(0, 1]`. SIMPLEC canonically uses 1.0.
    pub alpha_p: f64,
    /// Upper bound on outer iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both velocity residuals, in `(0, 1)`.
    pub tolerance: f64,
    /// Tangential velocity of the moving lid, `> 0`.
    pub lid_velocity: f64,
    /// Per-face or legacy scalar momentum coefficients.
    pub coefficient_mode: CoefficientMode,
}

impl SimulationParameters {
    /// Parameters for the given Reynolds number with the standard defaults:
    /// a 41×41 grid, `alpha_u = 0.7`, `alpha_p = 1.0`, 10 000 iterations,
    /// tolerance `1e-5`, unit lid velocity, per-face coefficients.
    pub fn new(reynolds_number: f64) -> Self {
        Self {
            reynolds_number,
            nx: DEFAULT_GRID_SIZE,
            ny: DEFAULT_GRID_SIZE,
            alpha_u: 0.7,
            alpha_p: 1.0,
            max_iter: 10_000,
            tolerance: 1e-5,
            lid_velocity: 1.0,
            coefficient_mode: CoefficientMode::PerFace,
        }
    }

    /// Set the node counts.
    pub fn with_grid(mut self, nx: usize, ny: usize) -> Self {
        self.nx = nx;
        self.ny = ny;
        self
    }

    /// Set the velocity and pressure relaxation factors.
    pub fn with_relaxation(mut self, alpha_u: f64, alpha_p: f64) -> Self {
        self.alpha_u = alpha_u;
        self.alpha_p = alpha_p;
        self
    }

    /// Set the outer iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the lid velocity.
    pub fn with_lid_velocity(mut self, lid_velocity: f64) -> Self {
        self.lid_velocity = lid_velocity;
        self
    }

    /// Select how momentum coefficients feed the pressure correction.
    pub fn with_coefficient_mode(mut self, mode: CoefficientMode) -> Self {
        self.coefficient_mode = mode;
        self
    }

    /// Dynamic viscosity `rho * U_lid * L / Re`.
    pub fn viscosity(&self) -> f64 {
        DENSITY * self.lid_velocity * CAVITY_LENGTH / self.reynolds_number
    }

    /// Grid spacing along x, `L / (nx - 1)`.
    pub fn dx(&self) -> f64 {
        CAVITY_LENGTH / (self.nx as f64 - 1.0)
    }

    /// Grid spacing along y, `L / (ny - 1)`.
    pub fn dy(&self) -> f64 {
        CAVITY_LENGTH / (self.ny as f64 - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let p = SimulationParameters::new(100.0);
        assert_eq!(p.nx, 41);
        assert_eq!(p.ny, 41);
        assert_eq!(p.alpha_u, 0.7);
        assert_eq!(p.alpha_p, 1.0);
        assert_eq!(p.max_iter, 10_000);
        assert_eq!(p.tolerance, 1e-5);
        assert_eq!(p.lid_velocity, 1.0);
        assert_eq!(p.coefficient_mode, CoefficientMode::PerFace);
    }

    #[test]
    fn viscosity_follows_reynolds_number() {
        let p = SimulationParameters::new(100.0);
        assert!((p.viscosity() - 0.01).abs() < 1e-15);
        let p = p.with_lid_velocity(2.0);
        assert!((p.viscosity() - 0.02).abs() < 1e-15);
    }

    #[test]
    fn spacing_spans_unit_cavity() {
        let p = SimulationParameters::new(100.0).with_grid(21, 11);
        assert!((p.dx() - 0.05).abs() < 1e-15);
        assert!((p.dy() - 0.1).abs() < 1e-15);
    }

    #[test]
    fn builders_chain() {
        let p = SimulationParameters::new(400.0)
            .with_relaxation(0.5, 0.8)
            .with_max_iter(250)
            .with_tolerance(1e-3)
            .with_coefficient_mode(CoefficientMode::LegacyScalar);
        assert_eq!(p.alpha_u, 0.5);
        assert_eq!(p.alpha_p, 0.8);
        assert_eq!(p.max_iter, 250);
        assert_eq!(p.tolerance, 1e-3);
        assert_eq!(p.coefficient_mode, CoefficientMode::LegacyScalar);
    }
}
