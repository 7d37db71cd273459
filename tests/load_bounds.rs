//! The clipped load factor stays in [0.1, 1.2] for any archetype and weather.

use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use grid_telemetry_sim::models::{LoadInput, LoadModel};
use grid_telemetry_sim::profiles::ProfileKind;

fn profile() -> impl Strategy<Value = ProfileKind> {
    prop_oneof![
        Just(ProfileKind::Residential),
        Just(ProfileKind::Industrial),
        Just(ProfileKind::Commercial),
    ]
}

proptest! {
    #[test]
    fn load_factor_is_clipped(
        kind in profile(),
        temperature_c in -30.0f64..=40.0,
        hour in 0u32..24,
        is_weekend in any::<bool>(),
        capacity_mw in 1.0f64..2_000.0,
        seed in any::<u64>(),
    ) {
        let model = LoadModel::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let input = LoadInput { capacity_mw, profile: kind, hour, is_weekend, temperature_c };

        let factor = model.load_factor(&input, &mut rng);
        prop_assert!((0.1..=1.2).contains(&factor), "factor {factor}");

        let reading = model.simulate(&input, &mut rng);
        prop_assert!(reading.actual_load_mw >= capacity_mw * 0.1 - 0.005);
        prop_assert!(reading.actual_load_mw <= capacity_mw * 1.2 + 0.005);
    }

    #[test]
    fn every_hour_has_a_factor(kind in profile(), hour in 0u32..24) {
        let f = kind.factor(hour);
        prop_assert!(f > 0.0 && f <= 1.0);
    }
}
