use lidflow_core::{CoefficientMode, ProgressReport};
use lidflow_solver::postprocess::vertical_centerline_u;
use lidflow_solver::{solve, SolvePhase, Solver};
use lidflow_test_utils::{
    assert_all_finite, assert_boundary_invariant, assert_result_shapes, minimal, re100_small,
    re100_small_with, RecordingSink, RejectingSink,
};

#[test]
fn re100_converges_on_21x21() {
    let params = re100_small();
    let result = solve(&params, None).unwrap();
    assert!(result.converged, "not converged: {:?}", result.final_residuals);
    assert!(result.final_residuals.below(params.tolerance));
    assert!(result.total_iterations < params.max_iter);
    assert_result_shapes(&result, 21, 21);
    assert_boundary_invariant(&result.velocity_u, &result.velocity_v, 1.0);
    assert_all_finite(result.pressure.as_slice());
}

#[test]
fn legacy_scalar_mode_also_converges() {
    let params = re100_small_with(CoefficientMode::LegacyScalar);
    let result = solve(&params, None).unwrap();
    assert!(result.converged, "not converged: {:?}", result.final_residuals);
    assert_boundary_invariant(&result.velocity_u, &result.velocity_v, 1.0);
}

#[test]
fn primary_vortex_reverses_flow_below_the_lid() {
    let result = solve(&re100_small(), None).unwrap();
    let line = vertical_centerline_u(&result);
    let (_, u_top) = line[line.len() - 1];
    assert_eq!(u_top, 1.0);
    let u_min = line
        .iter()
        .map(|&(_, u)| u)
        .fold(f64::INFINITY, f64::min);
    assert!(u_min < -0.1 && u_min > -0.3, "u_min = {u_min}");
}

#[test]
fn identical_parameters_give_identical_results() {
    let params = minimal(60);
    let a = solve(&params, None).unwrap();
    let b = solve(&params, None).unwrap();
    assert_eq!(a.pressure, b.pressure);
    assert_eq!(a.velocity_u, b.velocity_u);
    assert_eq!(a.velocity_v, b.velocity_v);
    assert_eq!(a.total_iterations, b.total_iterations);
    assert_eq!(a.final_residuals, b.final_residuals);
    let residuals = |r: &lidflow_core::SolveResult| -> Vec<(usize, f64, f64)> {
        r.convergence_history
            .iter()
            .map(|c| (c.iteration, c.residual_u, c.residual_v))
            .collect()
    };
    assert_eq!(residuals(&a), residuals(&b));
}

#[test]
fn minimum_grid_and_budget_complete() {
    let params = minimal(100);
    let result = solve(&params, None).unwrap();
    assert_result_shapes(&result, 10, 10);
    assert!(result.total_iterations <= 100);
    assert!(result.elapsed_time >= 0.0);
    assert_boundary_invariant(&result.velocity_u, &result.velocity_v, 1.0);
}

#[test]
fn callback_payloads_are_well_formed() {
    let params = minimal(50);
    let mut sink = RecordingSink::new();
    let result = solve(&params, Some(&mut sink)).unwrap();
    assert!(!sink.reports.is_empty());
    for report in &sink.reports {
        assert!(report.iteration < result.total_iterations);
        assert!(report.elapsed_time.is_finite() && report.elapsed_time >= 0.0);
    }
    assert_eq!(sink.iterations(), vec![0, 10, 20, 30, 40]);
    let history: Vec<usize> = result
        .convergence_history
        .iter()
        .map(|r| r.iteration)
        .collect();
    assert_eq!(history, sink.iterations());
}

#[test]
fn rejecting_sink_never_aborts() {
    let params = minimal(30);
    let mut sink = RejectingSink::default();
    let result = solve(&params, Some(&mut sink)).unwrap();
    assert_eq!(sink.rejected, 3);
    assert_eq!(result.total_iterations, 30);
}

#[test]
fn stepping_matches_single_call() {
    let params = minimal(40);
    let expected = solve(&params, None).unwrap();

    let mut solver = Solver::new(&params).unwrap();
    let mut ignore = |_: &ProgressReport| {};
    let mut phases = Vec::new();
    loop {
        let phase = solver.step(&mut ignore).unwrap();
        phases.push(phase);
        if phase.is_terminal() {
            break;
        }
    }
    let stepped = solver.finish();

    assert_eq!(phases.last(), Some(&SolvePhase::Exhausted));
    assert!(phases[..phases.len() - 1]
        .iter()
        .all(|&p| p == SolvePhase::Iterating));
    assert_eq!(stepped.velocity_u, expected.velocity_u);
    assert_eq!(stepped.velocity_v, expected.velocity_v);
    assert_eq!(stepped.pressure, expected.pressure);
    assert_eq!(stepped.total_iterations, expected.total_iterations);
}

#[test]
fn lid_velocity_scales_boundary() {
    let params = minimal(20).with_lid_velocity(3.0);
    let result = solve(&params, None).unwrap();
    assert_boundary_invariant(&result.velocity_u, &result.velocity_v, 3.0);
}

#[test]
fn coordinates_span_unit_cavity() {
    let params = minimal(1).with_grid(11, 21);
    let result = solve(&params, None).unwrap();
    assert_eq!(result.x_coords.first(), Some(&0.0));
    assert!((result.x_coords[10] - 1.0).abs() < 1e-15);
    assert!((result.y_coords[10] - 0.5).abs() < 1e-15);
    assert!(result
        .y_coords
        .windows(2)
        .all(|w| (w[1] - w[0] - 0.05).abs() < 1e-12));
}
