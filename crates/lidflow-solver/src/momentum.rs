//! Momentum predictor: provisional velocities from the current pressure.
//!
//! Hybrid upwind convection plus central diffusion on every solved face,
//! one Jacobi-style pass per component with under-relaxation. Reads
//! `p`, `u`, `v`; writes `u_star`, `v_star` and the central coefficients.

use lidflow_core::StageError;

use crate::grid::StaggeredGrid;
use crate::stage::{Stage, StageContext};

/// Discretization coefficients of one momentum control volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Links {
    pub(crate) east: f64,
    pub(crate) west: f64,
    pub(crate) north: f64,
    pub(crate) south: f64,
    pub(crate) centre: f64,
}

impl Links {
    /// Upwinded links from the four face mass fluxes and the two
    /// diffusion conductances.
    fn upwind(fluxes: [f64; 4], diff_ew: f64, diff_ns: f64) -> Self {
        let [c_e, c_w, c_n, c_s] = fluxes;
        let east = diff_ew + (-c_e).max(0.0);
        let west = diff_ew + c_w.max(0.0);
        let north = diff_ns + (-c_n).max(0.0);
        let south = diff_ns + c_s.max(0.0);
        let centre = east + west + north + south + (c_e - c_w) + (c_n - c_s);
        Self {
            east,
            west,
            north,
            south,
            centre,
        }
    }

    /// Under-relaxed update of `current` given its four neighbours
    /// (E, W, N, S) and the pressure source.
    fn relax(&self, current: f64, neighbours: [f64; 4], source: f64, alpha: f64) -> f64 {
        let [e, w, n, s] = neighbours;
        let numerator = self.east * e + self.west * w + self.north * n + self.south * s + source;
        (1.0 - alpha) * current + alpha * numerator / self.centre
    }
}

/// First SIMPLEC stage.
///
/// Faces are visited in row-major order; the central coefficient of the
/// last visited face is kept as the legacy scalar.
#[derive(Clone, Copy, Debug, Default)]
pub struct MomentumPredictor;

impl MomentumPredictor {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }

    fn predict_u(grid: &mut StaggeredGrid, ctx: &StageContext) {
        let geo = grid.geometry;
        let (dx, dy) = (geo.dx, geo.dy);
        let rho = ctx.density;
        let diff_ew = ctx.viscosity * dy / dx;
        let diff_ns = ctx.viscosity * dx / dy;
        let (u, v, p) = (&grid.u, &grid.v, &grid.p);

        for j in 1..geo.ny - 1 {
            for i in 1..geo.nx - 2 {
                let fluxes = [
                    0.5 * rho * dy * (u[(j, i)] + u[(j, i + 1)]),
                    0.5 * rho * dy * (u[(j, i - 1)] + u[(j, i)]),
                    0.5 * rho * dx * (v[(j, i)] + v[(j, i + 1)]),
                    0.5 * rho * dx * (v[(j - 1, i)] + v[(j - 1, i + 1)]),
                ];
                let links = Links::upwind(fluxes, diff_ew, diff_ns);
                let source = (p[(j, i)] - p[(j, i + 1)]) * dy;
                let neighbours = [u[(j, i + 1)], u[(j, i - 1)], u[(j + 1, i)], u[(j - 1, i)]];
                grid.u_star[(j, i)] = links.relax(u[(j, i)], neighbours, source, ctx.alpha_u);
                grid.a_p_u[(j, i)] = links.centre;
                grid.last_a_p_u = links.centre;
            }
        }
    }

    fn predict_v(grid: &mut StaggeredGrid, ctx: &StageContext) {
        let geo = grid.geometry;
        let (dx, dy) = (geo.dx, geo.dy);
        let rho = ctx.density;
        let diff_ew = ctx.viscosity * dy / dx;
        let diff_ns = ctx.viscosity * dx / dy;
        let (u, v, p) = (&grid.u, &grid.v, &grid.p);

        for j in 1..geo.ny - 2 {
            for i in 1..geo.nx - 1 {
                let fluxes = [
                    0.5 * rho * dy * (u[(j, i)] + u[(j + 1, i)]),
                    0.5 * rho * dy * (u[(j, i - 1)] + u[(j + 1, i - 1)]),
                    0.5 * rho * dx * (v[(j, i)] + v[(j + 1, i)]),
                    0.5 * rho * dx * (v[(j - 1, i)] + v[(j, i)]),
                ];
                let links = Links::upwind(fluxes, diff_ew, diff_ns);
                let source = (p[(j, i)] - p[(j + 1, i)]) * dx;
                let neighbours = [v[(j, i + 1)], v[(j, i - 1)], v[(j + 1, i)], v[(j - 1, i)]];
                grid.v_star[(j, i)] = links.relax(v[(j, i)], neighbours, source, ctx.alpha_u);
                grid.a_p_v[(j, i)] = links.centre;
                grid.last_a_p_v = links.centre;
            }
        }
    }
}

impl Stage for MomentumPredictor {
    fn name(&self) -> &str {
        "momentum_predictor"
    }

    fn apply(&self, grid: &mut StaggeredGrid, ctx: &StageContext) -> Result<(), StageError> {
        Self::predict_u(grid, ctx);
        Self::predict_v(grid, ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridGeometry;
    use lidflow_core::SimulationParameters;

    fn setup(n: usize) -> (StaggeredGrid, StageContext) {
        let params = SimulationParameters::new(100.0).with_grid(n, n);
        let grid = StaggeredGrid::new(GridGeometry::new(n, n).unwrap());
        (grid, StageContext::from_params(&params))
    }

    #[test]
    fn upwind_links_without_flow_are_pure_diffusion() {
        let links = Links::upwind([0.0; 4], 0.01, 0.02);
        assert_eq!(links.east, 0.01);
        assert_eq!(links.west, 0.01);
        assert_eq!(links.north, 0.02);
        assert_eq!(links.south, 0.02);
        assert!((links.centre - 0.06).abs() < 1e-15);
    }

    #[test]
    fn upwind_picks_donor_side() {
        // Uniform eastward flux of 1: west is upstream.
        let links = Links::upwind([1.0, 1.0, 0.0, 0.0], 0.0, 0.0);
        assert_eq!(links.east, 0.0);
        assert_eq!(links.west, 1.0);
        assert_eq!(links.centre, 1.0);
    }

    #[test]
    fn quiescent_field_stays_at_rest() {
        let (mut grid, ctx) = setup(6);
        MomentumPredictor::new().apply(&mut grid, &ctx).unwrap();
        assert!(grid.u_star().as_slice().iter().all(|&x| x == 0.0));
        assert!(grid.v_star().as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn central_coefficient_is_diffusion_sum_at_rest() {
        let (mut grid, ctx) = setup(6);
        MomentumPredictor::new().apply(&mut grid, &ctx).unwrap();
        // dx == dy so each link is mu.
        let expected = 4.0 * ctx.viscosity;
        assert!((grid.a_p_u()[(2, 2)] - expected).abs() < 1e-15);
        assert!((grid.a_p_v()[(2, 2)] - expected).abs() < 1e-15);
        assert_eq!(grid.last_a_p_u, grid.a_p_u()[(4, 3)]);
        assert_eq!(grid.last_a_p_v, grid.a_p_v()[(3, 4)]);
        // Wall faces are never visited.
        assert_eq!(grid.a_p_u()[(0, 2)], 0.0);
        assert_eq!(grid.a_p_u()[(2, 4)], 0.0);
    }

    #[test]
    fn lid_drags_top_interior_row() {
        let (mut grid, ctx) = setup(6);
        for i in 0..5 {
            grid.u_mut()[(5, i)] = 1.0;
        }
        MomentumPredictor::new().apply(&mut grid, &ctx).unwrap();
        assert!(grid.u_star()[(4, 2)] > 0.0);
        assert_eq!(grid.u_star()[(3, 2)], 0.0);
        // Predictor only writes provisional arrays.
        assert_eq!(grid.u()[(4, 2)], 0.0);
    }

    #[test]
    fn pressure_gradient_drives_flow_toward_low_pressure() {
        let (mut grid, ctx) = setup(6);
        for j in 0..6 {
            for i in 0..6 {
                grid.p_mut()[(j, i)] = -(i as f64);
            }
        }
        MomentumPredictor::new().apply(&mut grid, &ctx).unwrap();
        assert!(grid.u_star()[(2, 2)] > 0.0);
        assert_eq!(grid.v_star()[(2, 2)], 0.0);
    }
}
