//! No-slip walls and the moving lid.

use lidflow_core::StageError;

use crate::grid::StaggeredGrid;
use crate::stage::{Stage, StageContext};

/// Final SIMPLEC stage.
///
/// Afterwards:
/// - `u` is zero on the bottom row and the left/right wall columns,
///   except the top row, which is the lid velocity (corners included);
/// - `v` is zero on the left/right columns and the bottom/top rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundaryEnforcer;

impl BoundaryEnforcer {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }
}

impl Stage for BoundaryEnforcer {
    fn name(&self) -> &str {
        "boundary_enforcer"
    }

    fn apply(&self, grid: &mut StaggeredGrid, ctx: &StageContext) -> Result<(), StageError> {
        let (nx, ny) = (grid.geometry.nx, grid.geometry.ny);

        let u = &mut grid.u;
        u.row_mut(0).fill(0.0);
        for j in 0..ny {
            u[(j, 0)] = 0.0;
            u[(j, nx - 2)] = 0.0;
        }
        // Lid last so it wins at the top corners.
        u.row_mut(ny - 1).fill(ctx.lid_velocity);

        let v = &mut grid.v;
        for j in 0..ny - 1 {
            v[(j, 0)] = 0.0;
            v[(j, nx - 1)] = 0.0;
        }
        v.row_mut(0).fill(0.0);
        v.row_mut(ny - 2).fill(0.0);
        Ok(())
    }
}
