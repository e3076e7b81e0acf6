use lidflow_core::{CoefficientMode, SimulationParameters};
use lidflow_solver::solve;
use lidflow_test_utils::{assert_boundary_invariant, assert_result_shapes, RecordingSink};
use proptest::prelude::*;

fn arb_mode() -> impl Strategy<Value = CoefficientMode> {
    prop_oneof![
        Just(CoefficientMode::PerFace),
        Just(CoefficientMode::LegacyScalar),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn small_solves_are_well_formed(
        nx in 3usize..14,
        ny in 3usize..14,
        reynolds in 1.0f64..1000.0,
        alpha_u in 0.1f64..=1.0,
        max_iter in 0usize..25,
        lid in 0.1f64..5.0,
        mode in arb_mode(),
    ) {
        let params = SimulationParameters::new(reynolds)
            .with_grid(nx, ny)
            .with_relaxation(alpha_u, 1.0)
            .with_max_iter(max_iter)
            .with_lid_velocity(lid)
            .with_coefficient_mode(mode);
        let mut sink = RecordingSink::new();
        let result = solve(&params, Some(&mut sink)).unwrap();

        assert_result_shapes(&result, nx, ny);
        prop_assert!(result.total_iterations <= max_iter);
        if result.total_iterations > 0 {
            assert_boundary_invariant(&result.velocity_u, &result.velocity_v, lid);
        }

        let expected_samples = result.total_iterations.div_ceil(10);
        prop_assert_eq!(result.convergence_history.len(), expected_samples);
        prop_assert_eq!(sink.reports.len(), expected_samples);
        for report in &sink.reports {
            prop_assert!(report.iteration < result.total_iterations);
            prop_assert_eq!(report.iteration % 10, 0);
            prop_assert!(report.elapsed_time >= 0.0);
        }
        prop_assert_eq!(result.converged, result.final_residuals.below(params.tolerance));
    }
}
