use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::models::position::Position;
use crate::models::quote::{Quote, QuoteCache};
use crate::models::sort::{SortColumn, SortDirection};
use crate::services::valuation_service::{
    compute_diff, compute_outcome, compute_value, intrinsic_value,
};

/// Comparison key for one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// No usable value (pending/unavailable quote, blank or bad expiration).
    /// Always ordered after every other key, in both directions.
    Unresolved,
}

impl SortKey {
    /// Order two keys for the given direction. `Unresolved` sinks either way.
    pub fn compare(&self, other: &Self, direction: SortDirection) -> Ordering {
        let ordering = match (self, other) {
            (SortKey::Unresolved, SortKey::Unresolved) => return Ordering::Equal,
            (SortKey::Unresolved, _) => return Ordering::Greater,
            (_, SortKey::Unresolved) => return Ordering::Less,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            // Keys of one column always share a variant.
            _ => Ordering::Equal,
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Derive the sort key of `position` for `column`.
///
/// `year` resolves year-less expirations ("M/D") into dates.
pub fn sort_key(column: SortColumn, position: &Position, quote: Quote, year: i32) -> SortKey {
    let price = quote.price();
    match column {
        SortColumn::Ticker => SortKey::Text(position.ticker.clone()),
        SortColumn::Ends => position
            .expiration()
            .and_then(|md| md.to_date(year))
            .map(SortKey::Date)
            .unwrap_or(SortKey::Unresolved),
        SortColumn::Option => SortKey::Text(position.kind.to_string()),
        SortColumn::Contracts => SortKey::Number(f64::from(position.contracts)),
        SortColumn::Premium => SortKey::Number(position.premium),
        SortColumn::Strike => SortKey::Number(position.strike),
        SortColumn::Current => price.map(SortKey::Number).unwrap_or(SortKey::Unresolved),
        SortColumn::Diff => price
            .map(|p| SortKey::Number(compute_diff(position.kind, p, position.strike)))
            .unwrap_or(SortKey::Unresolved),
        SortColumn::Outcome => price
            .map(|p| {
                let label = compute_outcome(position.kind, p, position.strike)
                    .map(|o| o.label())
                    .unwrap_or("");
                SortKey::Text(label.to_string())
            })
            .unwrap_or(SortKey::Unresolved),
        SortColumn::Value => price
            .map(|p| {
                let outcome = compute_outcome(position.kind, p, position.strike);
                // Rows without an outcome still order by the general formula.
                let value = compute_value(
                    position.kind,
                    outcome,
                    p,
                    position.strike,
                    position.contracts,
                    position.premium,
                )
                .unwrap_or_else(|| {
                    intrinsic_value(
                        position.kind,
                        p,
                        position.strike,
                        position.contracts,
                        position.premium,
                    )
                });
                SortKey::Number(value)
            })
            .unwrap_or(SortKey::Unresolved),
    }
}

/// Stable in-place sort of positions by one column.
///
/// Ties (including two unresolved keys) break by ticker, ascending.
pub fn sort_positions(
    positions: &mut [Position],
    column: SortColumn,
    direction: SortDirection,
    quotes: &QuoteCache,
    year: i32,
) {
    let mut keyed: Vec<(SortKey, Position)> = positions
        .iter()
        .map(|p| (sort_key(column, p, quotes.get(&p.ticker), year), p.clone()))
        .collect();

    keyed.sort_by(|(ka, pa), (kb, pb)| {
        ka.compare(kb, direction)
            .then_with(|| pa.ticker.cmp(&pb.ticker))
    });

    for (slot, (_, position)) in positions.iter_mut().zip(keyed) {
        *slot = position;
    }
}
