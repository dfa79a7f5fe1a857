use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::CoreError;

/// Sortable table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Ticker,
    Ends,
    Option,
    Contracts,
    Premium,
    Strike,
    Current,
    Diff,
    Outcome,
    Value,
}

impl SortColumn {
    pub const ALL: [SortColumn; 10] = [
        SortColumn::Ticker,
        SortColumn::Ends,
        SortColumn::Option,
        SortColumn::Contracts,
        SortColumn::Premium,
        SortColumn::Strike,
        SortColumn::Current,
        SortColumn::Diff,
        SortColumn::Outcome,
        SortColumn::Value,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            SortColumn::Ticker => "Ticker",
            SortColumn::Ends => "Ends",
            SortColumn::Option => "Option",
            SortColumn::Contracts => "Contracts",
            SortColumn::Premium => "Premium",
            SortColumn::Strike => "Strike",
            SortColumn::Current => "Current",
            SortColumn::Diff => "Diff",
            SortColumn::Outcome => "Outcome",
            SortColumn::Value => "Value",
        }
    }

    /// Columns whose key depends on the live quote.
    pub fn is_price_dependent(&self) -> bool {
        matches!(
            self,
            SortColumn::Current | SortColumn::Diff | SortColumn::Outcome | SortColumn::Value
        )
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for SortColumn {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .iter()
            .find(|c| c.header().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| CoreError::validation(format!("Unknown column '{}'.", s.trim())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Header-click state. Every column keeps its own last direction.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    directions: HashMap<SortColumn, SortDirection>,
    current: Option<(SortColumn, SortDirection)>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a click on `column` and return the direction to sort in.
    ///
    /// Each click flips that column's remembered direction; a column that
    /// was never clicked starts from `Ascending`, so its first click sorts
    /// descending. Other columns are unaffected.
    pub fn toggle(&mut self, column: SortColumn) -> SortDirection {
        let next = self.direction_of(column).flipped();
        self.directions.insert(column, next);
        self.current = Some((column, next));
        next
    }

    /// Last direction used for a column (`Ascending` if never clicked).
    pub fn direction_of(&self, column: SortColumn) -> SortDirection {
        self.directions.get(&column).copied().unwrap_or_default()
    }

    /// Most recent sort applied, if any.
    pub fn current(&self) -> Option<(SortColumn, SortDirection)> {
        self.current
    }
}
