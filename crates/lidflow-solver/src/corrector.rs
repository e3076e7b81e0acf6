//! Field corrector: applies `p_prime` to pressure and velocity.

use lidflow_core::StageError;

use crate::grid::StaggeredGrid;
use crate::stage::{Stage, StageContext};

/// Third SIMPLEC stage.
///
/// `p += alpha_p * p_prime` everywhere, then the provisional velocities on
/// solved faces are corrected by the d-factor times the `p_prime`
/// difference across the face. Wall entries of `u`, `v` are left as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldCorrector;

impl FieldCorrector {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }
}

impl Stage for FieldCorrector {
    fn name(&self) -> &str {
        "field_corrector"
    }

    fn apply(&self, grid: &mut StaggeredGrid, ctx: &StageContext) -> Result<(), StageError> {
        let geo = grid.geometry;

        for (p, pp) in grid
            .p
            .as_mut_slice()
            .iter_mut()
            .zip(grid.p_prime.as_slice())
        {
            *p += ctx.alpha_p * pp;
        }

        for j in 1..geo.ny - 1 {
            for i in 1..geo.nx - 2 {
                let d = grid.d_u(j, i, ctx);
                let dp = grid.p_prime[(j, i + 1)] - grid.p_prime[(j, i)];
                grid.u[(j, i)] = grid.u_star[(j, i)] - d * dp;
            }
        }

        for j in 1..geo.ny - 2 {
            for i in 1..geo.nx - 1 {
                let d = grid.d_v(j, i, ctx);
                let dp = grid.p_prime[(j + 1, i)] - grid.p_prime[(j, i)];
                grid.v[(j, i)] = grid.v_star[(j, i)] - d * dp;
            }
        }
        Ok(())
    }
}
