//! Staggered-grid geometry and field storage.
//!
//! For `nx × ny` pressure nodes the arrays are laid out as:
//!
//! ```text
//! p, p_prime          (ny,     nx)      cell centres
//! u, u_star, a_p_u    (ny,     nx - 1)  vertical faces
//! v, v_star, a_p_v    (ny - 1, nx)      horizontal faces
//! ```
//!
//! `u[(j, i)]` sits between `p[(j, i)]` and `p[(j, i + 1)]`;
//! `v[(j, i)]` sits between `p[(j, i)]` and `p[(j + 1, i)]`. Row `ny - 1`
//! of `u` is the moving lid.

use lidflow_core::constants::{CAVITY_LENGTH, MIN_GRID_NODES};
use lidflow_core::{CoefficientMode, Field2, SolveError, StageError};

use crate::stage::StageContext;

/// Node counts and spacing of the unit cavity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    /// Pressure nodes along x.
    pub nx: usize,
    /// Pressure nodes along y.
    pub ny: usize,
    /// `L / (nx - 1)`.
    pub dx: f64,
    /// `L / (ny - 1)`.
    pub dy: f64,
}

impl GridGeometry {
    /// Geometry for `nx × ny` nodes over the unit cavity.
    ///
    /// # Errors
    ///
    /// [`SolveError::DegenerateGrid`] if either count is below
    /// [`MIN_GRID_NODES`].
    pub fn new(nx: usize, ny: usize) -> Result<Self, SolveError> {
        if nx < MIN_GRID_NODES || ny < MIN_GRID_NODES {
            return Err(SolveError::DegenerateGrid { nx, ny });
        }
        Ok(Self {
            nx,
            ny,
            dx: CAVITY_LENGTH / (nx - 1) as f64,
            dy: CAVITY_LENGTH / (ny - 1) as f64,
        })
    }

    /// Shape of the pressure arrays.
    pub fn p_shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Shape of the `u` arrays.
    pub fn u_shape(&self) -> (usize, usize) {
        (self.ny, self.nx - 1)
    }

    /// Shape of the `v` arrays.
    pub fn v_shape(&self) -> (usize, usize) {
        (self.ny - 1, self.nx)
    }

    /// `nx` evenly spaced samples over `[0, L]`.
    pub fn x_coords(&self) -> Vec<f64> {
        linspace(CAVITY_LENGTH, self.nx)
    }

    /// `ny` evenly spaced samples over `[0, L]`.
    pub fn y_coords(&self) -> Vec<f64> {
        linspace(CAVITY_LENGTH, self.ny)
    }

    /// Returns `true` for `u` faces the momentum predictor solves.
    pub fn is_solved_u(&self, j: usize, i: usize) -> bool {
        (1..self.ny - 1).contains(&j) && (1..self.nx - 2).contains(&i)
    }

    /// Returns `true` for `v` faces the momentum predictor solves.
    pub fn is_solved_v(&self, j: usize, i: usize) -> bool {
        (1..self.ny - 2).contains(&j) && (1..self.nx - 1).contains(&i)
    }
}

fn linspace(length: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![0.0];
    }
    let step = length / (n - 1) as f64;
    (0..n).map(|k| k as f64 * step).collect()
}

/// All mutable state of one solve.
///
/// Allocated zero-filled once per solve and owned exclusively by it.
/// Stages inside this crate borrow the arrays directly; stages written
/// elsewhere go through the accessors.
#[derive(Clone, Debug)]
pub struct StaggeredGrid {
    pub(crate) geometry: GridGeometry,
    pub(crate) p: Field2,
    pub(crate) p_prime: Field2,
    pub(crate) u: Field2,
    pub(crate) v: Field2,
    pub(crate) u_star: Field2,
    pub(crate) v_star: Field2,
    pub(crate) a_p_u: Field2,
    pub(crate) a_p_v: Field2,
    /// `a_P` of the last face visited by the `u` sweep.
    pub(crate) last_a_p_u: f64,
    /// `a_P` of the last face visited by the `v` sweep.
    pub(crate) last_a_p_v: f64,
    pub(crate) u_old: Field2,
    pub(crate) v_old: Field2,
}

impl StaggeredGrid {
    /// Zero-filled grid for the given geometry.
    pub fn new(geometry: GridGeometry) -> Self {
        let (pr, pc) = geometry.p_shape();
        let (ur, uc) = geometry.u_shape();
        let (vr, vc) = geometry.v_shape();
        Self {
            geometry,
            p: Field2::zeros(pr, pc),
            p_prime: Field2::zeros(pr, pc),
            u: Field2::zeros(ur, uc),
            v: Field2::zeros(vr, vc),
            u_star: Field2::zeros(ur, uc),
            v_star: Field2::zeros(vr, vc),
            a_p_u: Field2::zeros(ur, uc),
            a_p_v: Field2::zeros(vr, vc),
            last_a_p_u: 0.0,
            last_a_p_v: 0.0,
            u_old: Field2::zeros(ur, uc),
            v_old: Field2::zeros(vr, vc),
        }
    }

    /// Grid geometry.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Pressure.
    pub fn p(&self) -> &Field2 {
        &self.p
    }

    /// Mutable pressure.
    pub fn p_mut(&mut self) -> &mut Field2 {
        &mut self.p
    }

    /// Pressure correction of the current iteration.
    pub fn p_prime(&self) -> &Field2 {
        &self.p_prime
    }

    /// Mutable pressure correction.
    pub fn p_prime_mut(&mut self) -> &mut Field2 {
        &mut self.p_prime
    }

    /// Horizontal velocity.
    pub fn u(&self) -> &Field2 {
        &self.u
    }

    /// Mutable horizontal velocity.
    pub fn u_mut(&mut self) -> &mut Field2 {
        &mut self.u
    }

    /// Vertical velocity.
    pub fn v(&self) -> &Field2 {
        &self.v
    }

    /// Mutable vertical velocity.
    pub fn v_mut(&mut self) -> &mut Field2 {
        &mut self.v
    }

    /// Provisional horizontal velocity.
    pub fn u_star(&self) -> &Field2 {
        &self.u_star
    }

    /// Provisional vertical velocity.
    pub fn v_star(&self) -> &Field2 {
        &self.v_star
    }

    /// Momentum central coefficient per `u` face. Zero on unsolved faces.
    pub fn a_p_u(&self) -> &Field2 {
        &self.a_p_u
    }

    /// Momentum central coefficient per `v` face. Zero on unsolved faces.
    pub fn a_p_v(&self) -> &Field2 {
        &self.a_p_v
    }

    /// Velocities as they were at the start of the current iteration.
    pub fn previous_velocities(&self) -> (&Field2, &Field2) {
        (&self.u_old, &self.v_old)
    }

    /// Copy `u` and `v` into the start-of-iteration buffers.
    pub fn snapshot_velocities(&mut self) {
        // Shapes are fixed at construction and re-checked after every stage.
        self.u_old.copy_from(&self.u);
        self.v_old.copy_from(&self.v);
    }

    /// SIMPLEC d-factor `alpha_u * dy / a_P` of `u` face `(j, i)`.
    ///
    /// Unsolved (wall) faces give zero in per-face mode.
    pub fn d_u(&self, j: usize, i: usize, ctx: &StageContext) -> f64 {
        let a_p = match ctx.coefficient_mode {
            CoefficientMode::LegacyScalar => self.last_a_p_u,
            CoefficientMode::PerFace => {
                if !self.geometry.is_solved_u(j, i) {
                    return 0.0;
                }
                self.a_p_u[(j, i)]
            }
        };
        ctx.alpha_u * self.geometry.dy / a_p
    }

    /// SIMPLEC d-factor `alpha_u * dx / a_P` of `v` face `(j, i)`.
    ///
    /// Unsolved (wall) faces give zero in per-face mode.
    pub fn d_v(&self, j: usize, i: usize, ctx: &StageContext) -> f64 {
        let a_p = match ctx.coefficient_mode {
            CoefficientMode::LegacyScalar => self.last_a_p_v,
            CoefficientMode::PerFace => {
                if !self.geometry.is_solved_v(j, i) {
                    return 0.0;
                }
                self.a_p_v[(j, i)]
            }
        };
        ctx.alpha_u * self.geometry.dx / a_p
    }

    /// Verify every array still has the shape implied by the geometry.
    pub fn check_shapes(&self) -> Result<(), StageError> {
        let p = self.geometry.p_shape();
        let u = self.geometry.u_shape();
        let v = self.geometry.v_shape();
        let expectations: [(&'static str, &Field2, (usize, usize)); 10] = [
            ("p", &self.p, p),
            ("p_prime", &self.p_prime, p),
            ("u", &self.u, u),
            ("u_star", &self.u_star, u),
            ("a_p_u", &self.a_p_u, u),
            ("u_old", &self.u_old, u),
            ("v", &self.v, v),
            ("v_star", &self.v_star, v),
            ("a_p_v", &self.a_p_v, v),
            ("v_old", &self.v_old, v),
        ];
        for (field, array, expected) in expectations {
            if array.shape() != expected {
                return Err(StageError::ShapeMismatch {
                    field,
                    expected,
                    actual: array.shape(),
                });
            }
        }
        Ok(())
    }

    /// Move the final fields out of the grid: `(p, u, v)`.
    pub fn into_fields(self) -> (Field2, Field2, Field2) {
        (self.p, self.u, self.v)
    }
}
