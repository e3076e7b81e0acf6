//! Derived quantities for plotting and validation against benchmark data.

use lidflow_core::{Field2, SolveResult};

/// Staggered velocities averaged onto the `(ny, nx)` pressure nodes.
///
/// Interior columns of `u` and interior rows of `v` are face averages; the
/// side columns of `u_c` and the bottom/top rows of `v_c` stay zero.
pub fn cell_centered_velocity(result: &SolveResult) -> (Field2, Field2) {
    let (ny, nx) = result.pressure.shape();
    let (u, v) = (&result.velocity_u, &result.velocity_v);

    let mut u_c = Field2::zeros(ny, nx);
    for j in 0..ny {
        for i in 1..nx - 1 {
            u_c[(j, i)] = 0.5 * (u[(j, i - 1)] + u[(j, i)]);
        }
    }

    let mut v_c = Field2::zeros(ny, nx);
    for j in 1..ny - 1 {
        for i in 0..nx {
            v_c[(j, i)] = 0.5 * (v[(j - 1, i)] + v[(j, i)]);
        }
    }
    (u_c, v_c)
}

/// `(y, u)` along the node column `nx / 2`.
pub fn vertical_centerline_u(result: &SolveResult) -> Vec<(f64, f64)> {
    let (u_c, _) = cell_centered_velocity(result);
    let column = u_c.column(u_c.cols() / 2);
    result.y_coords.iter().copied().zip(column).collect()
}

/// `(x, v)` along the node row `ny / 2`.
pub fn horizontal_centerline_v(result: &SolveResult) -> Vec<(f64, f64)> {
    let (_, v_c) = cell_centered_velocity(result);
    let row = v_c.row(v_c.rows() / 2);
    result.x_coords.iter().copied().zip(row.iter().copied()).collect()
}

/// Speed `sqrt(u_c² + v_c²)` at every pressure node.
pub fn velocity_magnitude(result: &SolveResult) -> Field2 {
    let (u_c, v_c) = cell_centered_velocity(result);
    let mut speed = Field2::zeros(u_c.rows(), u_c.cols());
    for ((s, u), v) in speed
        .as_mut_slice()
        .iter_mut()
        .zip(u_c.as_slice())
        .zip(v_c.as_slice())
    {
        *s = u.hypot(*v);
    }
    speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidflow_core::ResidualPair;

    fn synthetic(nx: usize, ny: usize) -> SolveResult {
        let mut u = Field2::zeros(ny, nx - 1);
        let mut v = Field2::zeros(ny - 1, nx);
        for i in 0..nx - 1 {
            u[(ny - 1, i)] = 1.0;
        }
        for j in 1..ny - 1 {
            for i in 1..nx - 2 {
                u[(j, i)] = 0.2;
            }
        }
        for j in 1..ny - 2 {
            for i in 1..nx - 1 {
                v[(j, i)] = -0.4;
            }
        }
        SolveResult {
            pressure: Field2::zeros(ny, nx),
            velocity_u: u,
            velocity_v: v,
            x_coords: (0..nx).map(|k| k as f64 / (nx - 1) as f64).collect(),
            y_coords: (0..ny).map(|k| k as f64 / (ny - 1) as f64).collect(),
            convergence_history: Vec::new(),
            final_residuals: ResidualPair { u: 0.0, v: 0.0 },
            total_iterations: 0,
            elapsed_time: 0.0,
            converged: false,
        }
    }

    #[test]
    fn lid_row_survives_interpolation_and_walls_are_zero() {
        let r = synthetic(6, 5);
        let (u_c, v_c) = cell_centered_velocity(&r);
        assert_eq!(u_c.shape(), (5, 6));
        assert_eq!(v_c.shape(), (5, 6));
        for i in 1..5 {
            assert_eq!(u_c[(4, i)], 1.0);
        }
        for j in 0..5 {
            assert_eq!(u_c[(j, 0)], 0.0);
            assert_eq!(u_c[(j, 5)], 0.0);
        }
        assert!(v_c.row(0).iter().all(|&x| x == 0.0));
        assert!(v_c.row(4).iter().all(|&x| x == 0.0));
        // Between an interior face and a wall face.
        assert!((u_c[(2, 1)] - 0.1).abs() < 1e-15);
        assert!((u_c[(2, 2)] - 0.2).abs() < 1e-15);
    }

    #[test]
    fn centerlines_pair_coordinates() {
        let r = synthetic(6, 5);
        let u_line = vertical_centerline_u(&r);
        assert_eq!(u_line.len(), 5);
        assert_eq!(u_line[4], (1.0, 1.0));
        assert_eq!(u_line[0], (0.0, 0.0));
        let v_line = horizontal_centerline_v(&r);
        assert_eq!(v_line.len(), 6);
        assert_eq!(v_line[0].0, 0.0);
        assert!((v_line[3].1 + 0.4).abs() < 1e-15);
    }

    #[test]
    fn magnitude_is_non_negative() {
        let r = synthetic(6, 5);
        let speed = velocity_magnitude(&r);
        assert!(speed.as_slice().iter().all(|&s| s >= 0.0));
        assert_eq!(speed[(4, 2)], 1.0);
    }
}
