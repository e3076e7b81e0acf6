//! Test utilities for lidflow development.
//!
//! Parameter presets, a recording [`ProgressSink`], and assertion helpers
//! for the staggered-grid invariants. Stage fixtures live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use lidflow_core::{
    CoefficientMode, Field2, ProgressError, ProgressReport, ProgressSink, SimulationParameters,
    SolveResult,
};

/// Re = 100 on a 21×21 grid, 1000 iterations, tolerance 1e-4.
pub fn re100_small() -> SimulationParameters {
    SimulationParameters::new(100.0)
        .with_grid(21, 21)
        .with_max_iter(1000)
        .with_tolerance(1e-4)
}

/// Smallest grid the service accepts, with a short budget.
pub fn minimal(max_iter: usize) -> SimulationParameters {
    SimulationParameters::new(100.0)
        .with_grid(10, 10)
        .with_max_iter(max_iter)
}

/// [`re100_small`] with the given coefficient mode.
pub fn re100_small_with(mode: CoefficientMode) -> SimulationParameters {
    re100_small().with_coefficient_mode(mode)
}

/// Collects every report it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<ProgressReport>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iteration indices seen so far.
    pub fn iterations(&self) -> Vec<usize> {
        self.reports.iter().map(|r| r.iteration).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&mut self, progress: &ProgressReport) -> Result<(), ProgressError> {
        self.reports.push(*progress);
        Ok(())
    }
}

/// Rejects every report, counting how many it refused.
#[derive(Debug, Default)]
pub struct RejectingSink {
    pub rejected: usize,
}

impl ProgressSink for RejectingSink {
    fn report(&mut self, _progress: &ProgressReport) -> Result<(), ProgressError> {
        self.rejected += 1;
        Err(ProgressError::Rejected {
            reason: "test sink refuses everything".into(),
        })
    }
}

/// Panics unless every array in `result` has its staggered shape.
pub fn assert_result_shapes(result: &SolveResult, nx: usize, ny: usize) {
    assert_eq!(result.pressure.shape(), (ny, nx), "pressure shape");
    assert_eq!(result.velocity_u.shape(), (ny, nx - 1), "u shape");
    assert_eq!(result.velocity_v.shape(), (ny - 1, nx), "v shape");
    assert_eq!(result.x_coords.len(), nx, "x coords");
    assert_eq!(result.y_coords.len(), ny, "y coords");
}

/// Panics unless `u` and `v` satisfy the wall and lid conditions exactly.
pub fn assert_boundary_invariant(u: &Field2, v: &Field2, lid_velocity: f64) {
    let (ny, nu) = u.shape();
    for (i, &x) in u.row(ny - 1).iter().enumerate() {
        assert_eq!(x, lid_velocity, "u lid at column {i}");
    }
    for (i, &x) in u.row(0).iter().enumerate() {
        assert_eq!(x, 0.0, "u bottom at column {i}");
    }
    for j in 0..ny - 1 {
        assert_eq!(u[(j, 0)], 0.0, "u left wall at row {j}");
        assert_eq!(u[(j, nu - 1)], 0.0, "u right wall at row {j}");
    }

    let (nv, nx) = v.shape();
    for i in 0..nx {
        assert_eq!(v[(0, i)], 0.0, "v bottom at column {i}");
        assert_eq!(v[(nv - 1, i)], 0.0, "v top at column {i}");
    }
    for j in 0..nv {
        assert_eq!(v[(j, 0)], 0.0, "v left wall at row {j}");
        assert_eq!(v[(j, nx - 1)], 0.0, "v right wall at row {j}");
    }
}

/// Panics unless `values` is non-empty and all finite.
pub fn assert_all_finite(values: &[f64]) {
    assert!(!values.is_empty(), "no values");
    for (k, v) in values.iter().enumerate() {
        assert!(v.is_finite(), "non-finite value {v} at {k}");
    }
}
