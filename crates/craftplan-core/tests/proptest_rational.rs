//! Property-based tests for the exact rational arithmetic.
//!
//! Uses proptest to generate random fractions and verify the algebraic
//! laws the planner depends on.

use craftplan_core::rational::Rational;
use craftplan_core::units::{self, AmountUnit};
use num_traits::Signed;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_rational() -> impl Strategy<Value = Rational> {
    (-1_000_000i64..=1_000_000, 1i64..=1_000_000)
        .prop_map(|(n, d)| Rational::from_ratio(n, d).expect("nonzero denominator"))
}

fn arb_nonzero_rational() -> impl Strategy<Value = Rational> {
    arb_rational().prop_filter("nonzero", |r| !r.is_zero())
}

fn arb_rate_unit() -> impl Strategy<Value = AmountUnit> {
    prop_oneof![
        Just(AmountUnit::PerSecond),
        Just(AmountUnit::PerMinute),
        Just(AmountUnit::PerHour),
    ]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    /// a + (-a) == 0
    #[test]
    fn additive_inverse(a in arb_rational()) {
        prop_assert!((&a + &(-&a)).is_zero());
    }

    /// (a / b) * b == a for nonzero b
    #[test]
    fn division_inverts_multiplication(a in arb_rational(), b in arb_nonzero_rational()) {
        let quotient = a.checked_div(&b).expect("b is nonzero");
        prop_assert_eq!(&quotient * &b, a);
    }

    /// Denominator is strictly positive after any construction.
    #[test]
    fn denominator_always_positive(a in arb_rational(), b in arb_rational()) {
        prop_assert!((&a + &b).denom().is_positive());
        prop_assert!((&a - &b).denom().is_positive());
        prop_assert!((&a * &b).denom().is_positive());
    }

    /// Addition commutes and parses/prints exactly.
    #[test]
    fn display_round_trip(a in arb_rational()) {
        let printed = a.to_string();
        let parsed: Rational = printed.parse().expect("display form parses");
        prop_assert_eq!(parsed, a);
    }

    /// floor <= x <= ceil, both integers.
    #[test]
    fn floor_ceil_bracket(a in arb_rational()) {
        let floor = a.floor();
        let ceil = a.ceil();
        prop_assert!(floor <= a && a <= ceil);
        prop_assert!(floor.is_integer() && ceil.is_integer());
        prop_assert!(&ceil - &floor <= Rational::one());
    }

    /// round() is within 1/2 of the value.
    #[test]
    fn round_is_nearest(a in arb_rational()) {
        let rounded = a.round();
        let distance = (&a - &rounded).abs();
        prop_assert!(distance <= Rational::from_ratio(1, 2).expect("nonzero"));
    }

    /// Ordering agrees with subtraction sign.
    #[test]
    fn ordering_matches_subtraction(a in arb_rational(), b in arb_rational()) {
        let diff = &a - &b;
        prop_assert_eq!(a.cmp(&b), diff.signum().cmp(&0));
    }

    /// Rate conversions round-trip exactly through the per-second pivot.
    #[test]
    fn unit_round_trip(a in arb_rational(), unit in arb_rate_unit()) {
        let back = units::convert_from_per_second(
            &units::convert_to_per_second(&a, unit),
            unit,
        );
        prop_assert_eq!(back, a);
    }

    /// convert_units with equal endpoints is the identity.
    #[test]
    fn unit_identity(a in arb_rational(), unit in arb_rate_unit()) {
        prop_assert_eq!(units::convert_units(&a, unit, unit), a);
    }
}
