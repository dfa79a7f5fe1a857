// ═══════════════════════════════════════════════════════════════════
// Valuation Tests: outcome, diff, value and display formatting
// ═══════════════════════════════════════════════════════════════════

use options_monitor_core::models::position::{OptionKind, Position};
use options_monitor_core::models::quote::Quote;
use options_monitor_core::models::valuation::{DiffTone, Outcome};
use options_monitor_core::services::valuation_service::{
    compute_diff, compute_outcome, compute_value, format_amount, format_diff, format_quote,
    format_value, intrinsic_value, round_cents, value_position,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ═══════════════════════════════════════════════════════════════════
// Outcome & Diff
// ═══════════════════════════════════════════════════════════════════

mod outcome {
    use super::*;

    #[test]
    fn call_sells_when_strike_below_price() {
        assert_eq!(compute_outcome(OptionKind::Call, 110.0, 100.0), Some(Outcome::Sell));
        assert_eq!(compute_outcome(OptionKind::Call, 100.0, 100.0), None);
        assert_eq!(compute_outcome(OptionKind::Call, 90.0, 100.0), None);
    }

    #[test]
    fn put_purchases_when_strike_above_price() {
        assert_eq!(compute_outcome(OptionKind::Put, 90.0, 100.0), Some(Outcome::Purchase));
        assert_eq!(compute_outcome(OptionKind::Put, 100.0, 100.0), None);
        assert_eq!(compute_outcome(OptionKind::Put, 110.0, 100.0), None);
    }

    #[test]
    fn outcome_iff_rules_over_a_grid() {
        for kind in [OptionKind::Call, OptionKind::Put] {
            for price in [0.0, 49.99, 50.0, 50.01, 120.0] {
                let strike = 50.0;
                let expected = match kind {
                    OptionKind::Call if strike < price => Some(Outcome::Sell),
                    OptionKind::Put if strike > price => Some(Outcome::Purchase),
                    _ => None,
                };
                assert_eq!(compute_outcome(kind, price, strike), expected, "{kind} at {price}");
            }
        }
    }

    #[test]
    fn diff_sign_follows_kind() {
        assert!(approx(compute_diff(OptionKind::Call, 110.0, 100.0), 10.0));
        assert!(approx(compute_diff(OptionKind::Put, 110.0, 100.0), -10.0));
        assert!(approx(compute_diff(OptionKind::Put, 90.0, 100.0), 10.0));
    }

    #[test]
    fn labels() {
        assert_eq!(Outcome::Sell.label(), "Sell");
        assert_eq!(Outcome::Purchase.to_string(), "Purchase");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Value
// ═══════════════════════════════════════════════════════════════════

mod value {
    use super::*;

    #[test]
    fn call_example() {
        let outcome = compute_outcome(OptionKind::Call, 110.0, 100.0);
        let v = compute_value(OptionKind::Call, outcome, 110.0, 100.0, 2, 50.0).unwrap();
        assert!(approx(v, 1950.0));
    }

    #[test]
    fn put_purchase_uses_effective_cost() {
        let outcome = compute_outcome(OptionKind::Put, 90.0, 100.0);
        assert_eq!(outcome, Some(Outcome::Purchase));
        let v = compute_value(OptionKind::Put, outcome, 90.0, 100.0, 1, 20.0).unwrap();
        assert!((v - -980.0).abs() < 1e-6);
    }

    #[test]
    fn no_outcome_no_value() {
        assert_eq!(compute_value(OptionKind::Call, None, 90.0, 100.0, 1, 5.0), None);
    }

    #[test]
    fn intrinsic_value_floors_at_zero() {
        assert!(approx(intrinsic_value(OptionKind::Call, 90.0, 100.0, 1, 25.0), -25.0));
        assert!(approx(intrinsic_value(OptionKind::Put, 95.0, 100.0, 3, 0.0), 1500.0));
    }

    #[test]
    fn round_cents_normalizes() {
        assert_eq!(round_cents(1.005_1), 1.01);
        assert_eq!(round_cents(-0.001), 0.0);
        assert!(round_cents(-0.001).is_sign_positive());
    }
}

// ═══════════════════════════════════════════════════════════════════
// value_position
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn resolved_price() {
        let p = Position::new("AAPL", "", OptionKind::Put, 1, 20.0, 100.0).unwrap();
        let v = value_position(&p, Quote::Price(90.0));
        assert_eq!(v.quote, Quote::Price(90.0));
        assert!(approx(v.diff.unwrap(), 10.0));
        assert_eq!(v.outcome, Some(Outcome::Purchase));
        assert_eq!(v.value, Some(-980.0));
        assert_eq!(v.tone(), DiffTone::Favorable);
        assert!(v.is_actionable());
    }

    #[test]
    fn out_of_the_money_has_no_value() {
        let p = Position::new("AAPL", "", OptionKind::Call, 1, 20.0, 100.0).unwrap();
        let v = value_position(&p, Quote::Price(95.0));
        assert_eq!(v.outcome, None);
        assert_eq!(v.value, None);
        assert_eq!(v.tone(), DiffTone::Unfavorable);
        assert!(!v.is_actionable());
    }

    #[test]
    fn unresolved_quotes_are_blank() {
        let p = Position::new("AAPL", "", OptionKind::Call, 1, 20.0, 100.0).unwrap();
        for quote in [Quote::Pending, Quote::Unavailable] {
            let v = value_position(&p, quote);
            assert_eq!(v.diff, None);
            assert_eq!(v.outcome, None);
            assert_eq!(v.value, None);
            assert_eq!(v.tone(), DiffTone::Neutral);
        }
    }

    #[test]
    fn at_the_money_is_neutral() {
        let p = Position::new("AAPL", "", OptionKind::Call, 1, 0.0, 100.0).unwrap();
        let v = value_position(&p, Quote::Price(100.0));
        assert_eq!(v.tone(), DiffTone::Neutral);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Display formatting
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn integral_values_grouped_without_decimals() {
        assert_eq!(format_value(1950.0), "+1,950");
        assert_eq!(format_value(-980.0), "-980");
        assert_eq!(format_value(1_234_567.0), "+1,234,567");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn fractional_values_keep_two_decimals() {
        assert_eq!(format_value(12.5), "+12.50");
        assert_eq!(format_value(-1234.56), "-1,234.56");
    }

    #[test]
    fn negative_has_single_sign() {
        let s = format_value(-5000.0);
        assert_eq!(s, "-5,000");
        assert_eq!(s.matches('-').count(), 1);
    }

    #[test]
    fn diff_formatting() {
        assert_eq!(format_diff(1.5), "+1.50");
        assert_eq!(format_diff(-0.25), "-0.25");
        assert_eq!(format_diff(0.0), "");
    }

    #[test]
    fn quote_cells() {
        assert_eq!(format_quote(Quote::Pending), "....");
        assert_eq!(format_quote(Quote::Unavailable), "?");
        assert_eq!(format_quote(Quote::Price(101.5)), "101.50");
        assert_eq!(format_amount(150.0), "150");
    }

    #[test]
    fn fractional_amounts_keep_two_decimals() {
        assert_eq!(format_amount(150.5), "150.50");
        assert_eq!(format_amount(310.126), "310.13");
        assert_eq!(format_amount(99.999), "100");
    }
}
