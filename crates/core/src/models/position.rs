use chrono::NaiveDate;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::CoreError;

/// Longest ticker symbol accepted.
pub const MAX_TICKER_LEN: usize = 5;

/// Shares controlled by one option contract.
pub const SHARES_PER_CONTRACT: f64 = 100.0;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Call,
    Put,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Call => write!(f, "Call"),
            OptionKind::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = CoreError;

    /// Case-insensitive: "call", "CALL" and "Call" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionKind::Call),
            "put" => Ok(OptionKind::Put),
            _ => Err(CoreError::validation("Option must be Call or Put.")),
        }
    }
}

/// Any leap year; used to check a month/day pair exists at all.
const LEAP_YEAR: i32 = 2000;

/// A year-less expiration date parsed from "M/D" text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    /// Parse "M/D" (e.g. "3/21", "12/05"). Returns `None` for anything else,
    /// including days no month has (2/30, 4/31). 2/29 is accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let (m, d) = text.trim().split_once('/')?;
        let month: u32 = m.trim().parse().ok()?;
        let day: u32 = d.trim().parse().ok()?;
        NaiveDate::from_ymd_opt(LEAP_YEAR, month, day)?;
        Some(Self { month, day })
    }

    /// Resolve against a calendar year. `None` for dates like 2/30.
    pub fn to_date(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// One option position.
///
/// **Equality** compares the six persisted fields only, NOT `id`.
/// The id is assigned per session so rows can be addressed without
/// relying on their current position in the table.
#[derive(Debug, Clone)]
pub struct Position {
    /// Session-scoped identifier (never written to the CSV file)
    pub id: Uuid,

    /// Underlying symbol, uppercased (e.g., "AAPL")
    pub ticker: String,

    /// Expiration as entered, "M/D" or blank
    pub ends: String,

    pub kind: OptionKind,

    /// Number of contracts (always > 0)
    pub contracts: u32,

    /// Total premium paid for the whole position, not per share
    pub premium: f64,

    pub strike: f64,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.ticker == other.ticker
            && self.ends == other.ends
            && self.kind == other.kind
            && self.contracts == other.contracts
            && self.premium == other.premium
            && self.strike == other.strike
    }
}

impl Position {
    /// Build a position from already-typed values, enforcing the invariants.
    pub fn new(
        ticker: impl Into<String>,
        ends: impl Into<String>,
        kind: OptionKind,
        contracts: u32,
        premium: f64,
        strike: f64,
    ) -> Result<Self, CoreError> {
        let position = Self {
            id: Uuid::new_v4(),
            ticker: normalize_ticker(&ticker.into())?,
            ends: normalize_ends(&ends.into())?,
            kind,
            contracts,
            premium,
            strike,
        };
        position.validate()?;
        Ok(position)
    }

    /// Rebuild a position read back from storage.
    ///
    /// `ends` is kept verbatim (an unparseable value only affects sorting);
    /// every other invariant still applies.
    pub fn from_stored(
        ticker: &str,
        ends: &str,
        kind: OptionKind,
        contracts: u32,
        premium: f64,
        strike: f64,
    ) -> Result<Self, CoreError> {
        let position = Self {
            id: Uuid::new_v4(),
            ticker: ticker.trim().to_uppercase(),
            ends: ends.trim().to_string(),
            kind,
            contracts,
            premium,
            strike,
        };
        position.validate()?;
        Ok(position)
    }

    /// Parsed expiration, if `ends` holds a valid "M/D".
    pub fn expiration(&self) -> Option<MonthDay> {
        MonthDay::parse(&self.ends)
    }

    /// Check the record invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.ticker.is_empty() || self.ticker.chars().count() > MAX_TICKER_LEN {
            return Err(CoreError::validation("Invalid Ticker."));
        }
        if self.contracts == 0 {
            return Err(CoreError::validation("Contracts must be at least 1."));
        }
        if !self.premium.is_finite() || self.premium < 0.0 {
            return Err(CoreError::validation("Premium must be zero or more."));
        }
        if !self.strike.is_finite() || self.strike < 0.0 {
            return Err(CoreError::validation("Strike must be zero or more."));
        }
        Ok(())
    }
}

/// Raw form input for a new position, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionInput {
    pub ticker: String,
    pub ends: String,
    pub kind: String,
    pub contracts: String,
    pub premium: String,
    pub strike: String,
}

impl PositionInput {
    /// Validate and convert into a `Position`.
    pub fn parse(&self) -> Result<Position, CoreError> {
        let ends = normalize_ends(&self.ends)?;
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() || ticker.chars().count() > MAX_TICKER_LEN {
            return Err(CoreError::validation("Invalid Ticker."));
        }
        let kind: OptionKind = self.kind.parse()?;

        let numbers_error = || CoreError::validation("Check Contracts, Premium & Strike.");
        let contracts: u32 = self.contracts.trim().parse().map_err(|_| numbers_error())?;
        let premium: f64 = self.premium.trim().parse().map_err(|_| numbers_error())?;
        let strike: f64 = self.strike.trim().parse().map_err(|_| numbers_error())?;

        Position::new(ticker, ends, kind, contracts, premium, strike)
    }
}

/// Editable columns of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionField {
    Ticker,
    Ends,
    Option,
    Contracts,
    Premium,
    Strike,
}

impl std::fmt::Display for PositionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PositionField::Ticker => "Ticker",
            PositionField::Ends => "Ends",
            PositionField::Option => "Option",
            PositionField::Contracts => "Contracts",
            PositionField::Premium => "Premium",
            PositionField::Strike => "Strike",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PositionField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ticker" => Ok(PositionField::Ticker),
            "ends" | "close" | "expiration" => Ok(PositionField::Ends),
            "option" | "kind" => Ok(PositionField::Option),
            "contracts" => Ok(PositionField::Contracts),
            "premium" => Ok(PositionField::Premium),
            "strike" => Ok(PositionField::Strike),
            other => Err(CoreError::validation(format!("Unknown column '{other}'."))),
        }
    }
}

/// Uppercase and length-check a ticker.
pub fn normalize_ticker(raw: &str) -> Result<String, CoreError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.chars().count() > MAX_TICKER_LEN {
        return Err(CoreError::validation("Ticker cannot exceed 5 characters."));
    }
    if ticker.is_empty() {
        return Err(CoreError::validation("Invalid Ticker."));
    }
    Ok(ticker)
}

/// Accept blank or a valid "M/D"; return the trimmed text.
pub fn normalize_ends(raw: &str) -> Result<String, CoreError> {
    let ends = raw.trim();
    if ends.is_empty() || MonthDay::parse(ends).is_some() {
        Ok(ends.to_string())
    } else {
        Err(CoreError::validation("Close must be M/D format or empty."))
    }
}
