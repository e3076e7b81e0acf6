//! Property tests for parameter-limit validation.

use lidflow_core::{CoefficientMode, SimulationParameters};
use lidflow_engine::{ConfigError, ParameterLimits};
use proptest::prelude::*;

fn mode() -> impl Strategy<Value = CoefficientMode> {
    prop_oneof![
        Just(CoefficientMode::PerFace),
        Just(CoefficientMode::LegacyScalar)
    ]
}

prop_compose! {
    fn in_range()(
        re in 0.001f64..99_999.0,
        nx in 10usize..=200,
        ny in 10usize..=200,
        alpha_u in 0.01f64..=1.0,
        alpha_p in 0.01f64..=1.0,
        max_iter in 100usize..=100_000,
        tolerance in 1e-12f64..0.99,
        lid in 0.001f64..1e3,
        mode in mode(),
    ) -> SimulationParameters {
        SimulationParameters::new(re)
            .with_grid(nx, ny)
            .with_relaxation(alpha_u, alpha_p)
            .with_max_iter(max_iter)
            .with_tolerance(tolerance)
            .with_lid_velocity(lid)
            .with_coefficient_mode(mode)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn in_range_parameters_validate(params in in_range()) {
        prop_assert_eq!(ParameterLimits::default().validate(&params), Ok(()));
    }

    #[test]
    fn oversized_grids_are_rejected(params in in_range(), nx in 201usize..10_000) {
        let err = ParameterLimits::default()
            .validate(&params.with_grid(nx, 41))
            .unwrap_err();
        prop_assert_eq!(
            err,
            ConfigError::GridOutOfRange { axis: "nx", value: nx, min: 10, max: 200 }
        );
    }

    #[test]
    fn first_violation_wins(params in in_range(), re in 100_000f64..1e9) {
        // Reynolds is checked before the iteration budget.
        let mut bad = params.with_max_iter(1);
        bad.reynolds_number = re;
        let is_reynolds = matches!(
            ParameterLimits::default().validate(&bad),
            Err(ConfigError::ReynoldsOutOfRange { .. })
        );
        prop_assert!(is_reynolds);
    }
}
