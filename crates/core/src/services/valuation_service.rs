use crate::models::position::{OptionKind, Position, SHARES_PER_CONTRACT};
use crate::models::quote::Quote;
use crate::models::valuation::{Outcome, Valuation};

// Pure valuation functions. No I/O, no state.

/// `Sell` for an in-the-money call, `Purchase` for an in-the-money put.
///
/// `price` must be a resolved price, never a pending/unavailable quote.
pub fn compute_outcome(kind: OptionKind, price: f64, strike: f64) -> Option<Outcome> {
    match kind {
        OptionKind::Call if strike < price => Some(Outcome::Sell),
        OptionKind::Put if strike > price => Some(Outcome::Purchase),
        _ => None,
    }
}

/// Signed distance between price and strike, positive when favorable.
pub fn compute_diff(kind: OptionKind, price: f64, strike: f64) -> f64 {
    match kind {
        OptionKind::Call => price - strike,
        OptionKind::Put => strike - price,
    }
}

/// Paper value of a position, or `None` when there is no outcome.
///
/// - Put with outcome `Purchase`: valued as assigned shares bought at the
///   effective cost basis `strike - premium / shares`, i.e.
///   `(price - effective_cost) * shares`. The premium is already inside the
///   cost basis and is not subtracted again.
/// - Everything else: `max(0, diff) * shares - premium`.
pub fn compute_value(
    kind: OptionKind,
    outcome: Option<Outcome>,
    price: f64,
    strike: f64,
    contracts: u32,
    premium: f64,
) -> Option<f64> {
    let outcome = outcome?;
    Some(raw_value(kind, outcome, price, strike, contracts, premium))
}

fn raw_value(
    kind: OptionKind,
    outcome: Outcome,
    price: f64,
    strike: f64,
    contracts: u32,
    premium: f64,
) -> f64 {
    let shares = f64::from(contracts) * SHARES_PER_CONTRACT;
    if kind == OptionKind::Put && outcome == Outcome::Purchase {
        let effective_cost = strike - premium / shares;
        (price - effective_cost) * shares
    } else {
        intrinsic_value(kind, price, strike, contracts, premium)
    }
}

/// `max(0, diff) * shares - premium`, defined for every resolved price.
pub fn intrinsic_value(kind: OptionKind, price: f64, strike: f64, contracts: u32, premium: f64) -> f64 {
    let intrinsic = compute_diff(kind, price, strike).max(0.0);
    intrinsic * f64::from(contracts) * SHARES_PER_CONTRACT - premium
}

/// Value the position against the given quote.
pub fn value_position(position: &Position, quote: Quote) -> Valuation {
    let Some(price) = quote.price() else {
        return Valuation {
            quote,
            diff: None,
            outcome: None,
            value: None,
        };
    };

    let diff = compute_diff(position.kind, price, position.strike);
    let outcome = compute_outcome(position.kind, price, position.strike);
    let value = compute_value(
        position.kind,
        outcome,
        price,
        position.strike,
        position.contracts,
        position.premium,
    )
    .map(round_cents);

    Valuation {
        quote,
        diff: Some(diff),
        outcome,
        value,
    }
}

pub fn round_cents(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    // Keep -0.0 out of the display path.
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

// ── Display formatting ──────────────────────────────────────────────

/// "+1,950", "-980", "+12.50", "0".
pub fn format_value(value: f64) -> String {
    let v = round_cents(value);
    let sign = if v > 0.0 {
        "+"
    } else if v < 0.0 {
        "-"
    } else {
        ""
    };
    let abs = v.abs();
    let body = if abs.fract() == 0.0 {
        group_thousands(&format!("{abs:.0}"))
    } else {
        group_thousands(&format!("{abs:.2}"))
    };
    format!("{sign}{body}")
}

/// "+1.50" / "-0.25"; blank when the diff is exactly zero.
pub fn format_diff(diff: f64) -> String {
    if diff > 0.0 {
        format!("+{diff:.2}")
    } else if diff < 0.0 {
        format!("-{:.2}", diff.abs())
    } else {
        String::new()
    }
}

/// Integral amounts without decimals, otherwise exactly two: "150", "150.50".
pub fn format_amount(amount: f64) -> String {
    let v = round_cents(amount);
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Current-price cell: "...." while pending, "?" when unavailable.
pub fn format_quote(quote: Quote) -> String {
    match quote {
        Quote::Pending => "....".to_string(),
        Quote::Unavailable => "?".to_string(),
        Quote::Price(p) => format_amount(p),
    }
}

/// Insert thousands separators into the integer part of a plain number.
fn group_thousands(number: &str) -> String {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (number, None),
    };
    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(number.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}
