use std::collections::BTreeSet;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::position::{
    normalize_ends, normalize_ticker, OptionKind, Position, PositionField,
};

/// Mutations on the ordered position list.
///
/// Pure business logic: no I/O, no quotes. Every operation either applies
/// fully or leaves the list untouched.
pub struct PositionService;

impl PositionService {
    pub fn new() -> Self {
        Self
    }

    /// Append a validated position.
    pub fn add_position(
        &self,
        positions: &mut Vec<Position>,
        position: Position,
    ) -> Result<Uuid, CoreError> {
        position.validate()?;
        let id = position.id;
        positions.push(position);
        Ok(id)
    }

    /// Replace one field of a position from raw user text.
    ///
    /// The new value is validated before anything is written.
    pub fn edit_field(
        &self,
        positions: &mut [Position],
        id: Uuid,
        field: PositionField,
        raw: &str,
    ) -> Result<(), CoreError> {
        let idx = Self::index_of(positions, id)?;
        let mut updated = positions[idx].clone();
        let raw = raw.trim();

        match field {
            PositionField::Ticker => updated.ticker = normalize_ticker(raw)?,
            PositionField::Ends => updated.ends = normalize_ends(raw)?,
            PositionField::Option => updated.kind = raw.parse::<OptionKind>()?,
            PositionField::Contracts => {
                updated.contracts = raw.parse().map_err(|_| invalid_number())?;
            }
            PositionField::Premium => {
                updated.premium = raw.parse().map_err(|_| invalid_number())?;
            }
            PositionField::Strike => {
                updated.strike = raw.parse().map_err(|_| invalid_number())?;
            }
        }

        updated.validate()?;
        positions[idx] = updated;
        Ok(())
    }

    /// Remove a position by id and return it.
    pub fn remove_position(
        &self,
        positions: &mut Vec<Position>,
        id: Uuid,
    ) -> Result<Position, CoreError> {
        let idx = Self::index_of(positions, id)?;
        Ok(positions.remove(idx))
    }

    /// Remove several positions at once. If any id is unknown, nothing is removed.
    pub fn remove_positions(
        &self,
        positions: &mut Vec<Position>,
        ids: &[Uuid],
    ) -> Result<usize, CoreError> {
        for id in ids {
            Self::index_of(positions, *id)?;
        }
        let before = positions.len();
        positions.retain(|p| !ids.contains(&p.id));
        Ok(before - positions.len())
    }

    /// Find a position by id.
    pub fn get<'a>(&self, positions: &'a [Position], id: Uuid) -> Option<&'a Position> {
        positions.iter().find(|p| p.id == id)
    }

    /// Distinct tickers held, sorted.
    pub fn tickers(&self, positions: &[Position]) -> Vec<String> {
        positions
            .iter()
            .map(|p| p.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn index_of(positions: &[Position], id: Uuid) -> Result<usize, CoreError> {
        positions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PositionNotFound(id.to_string()))
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_number() -> CoreError {
    CoreError::validation("Invalid numeric value.")
}
