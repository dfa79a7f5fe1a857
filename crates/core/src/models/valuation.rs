use super::position::Position;
use super::quote::Quote;

/// Actionable result of an in-the-money position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Call whose strike is below the current price
    Sell,
    /// Put whose strike is above the current price
    Purchase,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Sell => "Sell",
            Outcome::Purchase => "Purchase",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Colour class of the Diff column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTone {
    /// diff > 0 (green)
    Favorable,
    /// diff < 0 (red)
    Unfavorable,
    /// diff == 0, or no price
    Neutral,
}

/// Point-in-time valuation of one position.
///
/// When the quote is not a resolved price, `diff`, `outcome` and `value`
/// are all `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub quote: Quote,
    pub diff: Option<f64>,
    pub outcome: Option<Outcome>,
    /// Paper gain/loss, rounded to cents. `None` when there is no outcome.
    pub value: Option<f64>,
}

impl Valuation {
    pub fn tone(&self) -> DiffTone {
        match self.diff {
            Some(d) if d > 0.0 => DiffTone::Favorable,
            Some(d) if d < 0.0 => DiffTone::Unfavorable,
            _ => DiffTone::Neutral,
        }
    }

    /// Rows with an outcome are highlighted in the table.
    pub fn is_actionable(&self) -> bool {
        self.outcome.is_some()
    }
}

/// One table row: the position, where it sits, and its valuation.
#[derive(Debug, Clone)]
pub struct PositionRow<'a> {
    /// Zero-based index in the store's current order
    pub index: usize,
    pub position: &'a Position,
    pub valuation: Valuation,
}
