//! Pressure-correction stage.
//!
//! Assembles the SIMPLEC pressure-correction equation from the
//! provisional velocities and relaxes it with a fixed number of in-place
//! Gauss-Seidel sweeps. `p_prime` is reset to zero first; boundary entries
//! of `p_prime` stay at zero.

use lidflow_core::StageError;

use crate::grid::StaggeredGrid;
use crate::stage::{Stage, StageContext};

/// Coefficients of the correction equation at one interior cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct CellCoefficients {
    east: f64,
    west: f64,
    north: f64,
    south: f64,
    centre: f64,
    /// Mass imbalance of the provisional velocity field.
    imbalance: f64,
}

/// Second SIMPLEC stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct PressureCorrection;

impl PressureCorrection {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }

    /// Coefficients for every interior cell, row-major over
    /// `j in 1..ny-1`, `i in 1..nx-1`.
    fn assemble(grid: &StaggeredGrid, ctx: &StageContext) -> Vec<CellCoefficients> {
        let geo = grid.geometry;
        let (dx, dy) = (geo.dx, geo.dy);
        let rho = ctx.density;
        let (u_star, v_star) = (&grid.u_star, &grid.v_star);

        let mut cells = Vec::with_capacity((geo.ny - 2) * (geo.nx - 2));
        for j in 1..geo.ny - 1 {
            for i in 1..geo.nx - 1 {
                let east = rho * grid.d_u(j, i, ctx) * dy;
                let west = rho * grid.d_u(j, i - 1, ctx) * dy;
                let north = rho * grid.d_v(j, i, ctx) * dx;
                let south = rho * grid.d_v(j - 1, i, ctx) * dx;
                let imbalance = rho * (u_star[(j, i)] - u_star[(j, i - 1)]) * dy
                    + rho * (v_star[(j, i)] - v_star[(j - 1, i)]) * dx;
                cells.push(CellCoefficients {
                    east,
                    west,
                    north,
                    south,
                    centre: east + west + north + south,
                    imbalance,
                });
            }
        }
        cells
    }
}

impl Stage for PressureCorrection {
    fn name(&self) -> &str {
        "pressure_correction"
    }

    fn apply(&self, grid: &mut StaggeredGrid, ctx: &StageContext) -> Result<(), StageError> {
        let geo = grid.geometry;
        let cells = Self::assemble(grid, ctx);
        let pp = &mut grid.p_prime;
        pp.fill(0.0);

        for _ in 0..ctx.pressure_sweeps {
            let mut k = 0;
            for j in 1..geo.ny - 1 {
                for i in 1..geo.nx - 1 {
                    let c = cells[k];
                    k += 1;
                    // NaN pivots are skipped too.
                    if !(c.centre > ctx.pivot_epsilon) {
                        continue;
                    }
                    let neighbours = c.east * pp[(j, i + 1)]
                        + c.west * pp[(j, i - 1)]
                        + c.north * pp[(j + 1, i)]
                        + c.south * pp[(j - 1, i)];
                    pp[(j, i)] = (neighbours - c.imbalance) / c.centre;
                }
            }
        }
        Ok(())
    }
}
