//! Property tests for scan-unit conversion.

use alsvid_experiments::{DelayUnit, Experiment, T1};
use proptest::prelude::*;

proptest! {
    /// Circuits generated from dt-unit delays record xval = delay * dt,
    /// and dividing the factor back out recovers the original delay.
    #[test]
    fn dt_conversion_round_trips(
        delay in 1.0f64..1e6,
        dt in prop_oneof![Just(1e-9), Just(2e-7), Just(4.5e-10)],
    ) {
        let exp = T1::new(0, vec![delay]).with_unit(DelayUnit::Dt).with_dt(dt);
        let circuits = exp.circuits().unwrap();
        let meta = circuits[0].metadata().unwrap();

        prop_assert_eq!(meta.unit.as_str(), "s");
        prop_assert!((meta.xval - delay * dt).abs() <= 1e-12 * meta.xval.abs());
        prop_assert!((meta.xval / dt - delay).abs() <= 1e-9 * delay);
    }

    /// Sub-second units scale by fixed powers of ten.
    #[test]
    fn named_units_scale_canonically(delay in 1.0f64..1000.0) {
        for (unit, factor) in [
            (DelayUnit::S, 1.0),
            (DelayUnit::Ms, 1e-3),
            (DelayUnit::Us, 1e-6),
            (DelayUnit::Ns, 1e-9),
        ] {
            let exp = T1::new(0, vec![delay]).with_unit(unit);
            let xval = exp.circuits().unwrap()[0].metadata().unwrap().xval;
            prop_assert!((xval - delay * factor).abs() <= 1e-12 * xval.abs());
        }
    }
}
