use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::position::{OptionKind, Position};

/// Column order of the positions file.
pub const HEADER: [&str; 6] = ["Ticker", "Ends", "Option", "Contracts", "Premium", "Strike"];

/// Fields per row in the current layout.
pub const FIELD_COUNT: usize = 6;

/// Fields per row in the older layout without a premium column:
/// `Ticker,Ends,Option,Contracts,Strike`.
pub const LEGACY_FIELD_COUNT: usize = 5;

/// Parse every usable row of a positions file.
///
/// Rows are dropped, never fatal, when they:
/// - are empty or the header row (first field `Ticker`)
/// - have a field count other than 6 (or 5, legacy)
/// - hold an unparseable number or option kind
/// - violate a position invariant
pub fn read_positions(data: &[u8]) -> Vec<Position> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let mut positions = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line = line + 1, error = %e, "skipping unreadable row");
                continue;
            }
        };
        if is_blank(&record) || record.get(0) == Some(HEADER[0]) {
            continue;
        }
        match parse_record(&record) {
            Some(position) => positions.push(position),
            None => debug!(line = line + 1, row = ?record, "skipping malformed row"),
        }
    }
    positions
}

/// Convert one row into a position, or `None` if it is malformed.
pub fn parse_record(record: &StringRecord) -> Option<Position> {
    let field = |i: usize| record.get(i).unwrap_or("");

    let (contracts, premium, strike) = match record.len() {
        FIELD_COUNT => (field(3), field(4), field(5)),
        LEGACY_FIELD_COUNT => (field(3), "0", field(4)),
        _ => return None,
    };

    let kind: OptionKind = field(2).parse().ok()?;
    let contracts: u32 = contracts.parse().ok()?;
    let premium: f64 = premium.parse().ok()?;
    let strike: f64 = strike.parse().ok()?;

    Position::from_stored(field(0), field(1), kind, contracts, premium, strike).ok()
}

/// Serialize positions (header first) in store order.
pub fn write_positions(positions: &[Position]) -> Result<Vec<u8>, CoreError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for p in positions {
        writer.write_record([
            p.ticker.clone(),
            p.ends.clone(),
            p.kind.to_string(),
            p.contracts.to_string(),
            p.premium.to_string(),
            p.strike.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| CoreError::Serialization(format!("Failed to flush CSV writer: {e}")))
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.is_empty())
}
