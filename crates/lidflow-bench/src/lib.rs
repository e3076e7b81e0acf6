//! Benchmark profiles and utilities for the lidflow solver.
//!
//! - [`reference_profile`]: 41×41 grid at Re = 100, the default problem
//! - [`stress_profile`]: 129×129 grid at Re = 400
//! - [`developed_state`]: a grid advanced past the start-up transient,
//!   for timing single stages on a realistic flow field

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use lidflow_core::{ProgressReport, SimulationParameters, SolveError};
use lidflow_solver::{Solver, StageContext, StaggeredGrid};

/// Default cavity: 41×41 nodes, Re = 100.
///
/// The tolerance is unreachable so every run executes exactly `iterations`
/// outer iterations.
pub fn reference_profile(iterations: usize) -> SimulationParameters {
    SimulationParameters::new(100.0)
        .with_grid(41, 41)
        .with_max_iter(iterations)
        .with_tolerance(f64::MIN_POSITIVE)
}

/// Fine cavity: 129×129 nodes (~16K cells), Re = 400.
///
/// Same fixed-iteration setup as [`reference_profile`].
pub fn stress_profile(iterations: usize) -> SimulationParameters {
    SimulationParameters::new(400.0)
        .with_grid(129, 129)
        .with_max_iter(iterations)
        .with_tolerance(f64::MIN_POSITIVE)
}

/// Run `warmup` outer iterations of `params` and return the grid state
/// together with the stage context.
pub fn developed_state(
    params: &SimulationParameters,
    warmup: usize,
) -> Result<(StaggeredGrid, StageContext), SolveError> {
    let mut solver = Solver::new(params)?;
    let mut sink = |_: &ProgressReport| {};
    for _ in 0..warmup {
        if solver.step(&mut sink)?.is_terminal() {
            break;
        }
    }
    Ok((solver.grid().clone(), StageContext::from_params(params)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_runs_fixed_iterations() {
        let result = lidflow_solver::solve(&reference_profile(12), None).unwrap();
        assert_eq!(result.total_iterations, 12);
        assert!(!result.converged);
    }

    #[test]
    fn unbounded_profiles_step() {
        let mut sink = |_: &ProgressReport| {};
        for params in [reference_profile(usize::MAX), stress_profile(usize::MAX)] {
            let mut solver = Solver::new(&params).unwrap();
            assert!(!solver.step(&mut sink).unwrap().is_terminal());
            assert_eq!(solver.iterations(), 1);
        }
    }

    #[test]
    fn developed_state_with_unbounded_budget() {
        let (grid, _) = developed_state(&reference_profile(usize::MAX), 3).unwrap();
        assert_eq!(grid.p().shape(), (41, 41));
    }

    #[test]
    fn stress_profile_shape() {
        let params = stress_profile(1);
        assert_eq!((params.nx, params.ny), (129, 129));
        assert_eq!(params.reynolds_number, 400.0);
    }

    #[test]
    fn developed_state_moves_the_interior() {
        let (grid, ctx) = developed_state(&reference_profile(100), 5).unwrap();
        assert_eq!(grid.u().shape(), (41, 40));
        assert!(grid.u()[(39, 20)] > 0.0);
        assert_eq!(ctx.pressure_sweeps, 50);
    }
}
