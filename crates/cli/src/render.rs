use chrono::{DateTime, Local};
use options_monitor_core::models::settings::RefreshInterval;
use options_monitor_core::models::sort::SortColumn;
use options_monitor_core::models::valuation::{DiffTone, PositionRow};
use options_monitor_core::services::valuation_service::{
    format_amount, format_diff, format_quote, format_value,
};

const ROW_HEADER: &str = "#";

/// Plain-text table of every row, one line per position.
///
/// Rows with an outcome are flagged with `*`; the diff column carries a
/// `▲`/`▼` marker for favorable/unfavorable moves.
pub fn render_table(rows: &[PositionRow<'_>]) -> String {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);

    let mut header = vec![ROW_HEADER.to_string()];
    header.extend(SortColumn::ALL.iter().map(|c| c.header().to_string()));
    lines.push(header);

    for row in rows {
        lines.push(row_cells(row));
    }

    let widths: Vec<usize> = (0..lines[0].len())
        .map(|col| {
            lines
                .iter()
                .map(|cells| cells[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (i, cells) in lines.iter().enumerate() {
        let flag = match i.checked_sub(1).and_then(|r| rows.get(r)) {
            Some(row) if row.valuation.is_actionable() => '*',
            _ => ' ',
        };
        out.push(flag);
        for (cell, width) in cells.iter().zip(&widths) {
            out.push(' ');
            out.push_str(cell);
            out.extend(std::iter::repeat(' ').take(width - cell.chars().count()));
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("  (no positions)\n");
    }
    out
}

fn row_cells(row: &PositionRow<'_>) -> Vec<String> {
    let p = row.position;
    let v = &row.valuation;
    let diff = match v.diff {
        Some(d) => {
            let marker = match v.tone() {
                DiffTone::Favorable => " ▲",
                DiffTone::Unfavorable => " ▼",
                DiffTone::Neutral => "",
            };
            format!("{}{marker}", format_diff(d))
        }
        None => String::new(),
    };

    vec![
        (row.index + 1).to_string(),
        p.ticker.clone(),
        p.ends.clone(),
        p.kind.to_string(),
        p.contracts.to_string(),
        format!("{}", p.premium.trunc()),
        format_amount(p.strike),
        format_quote(v.quote),
        diff,
        v.outcome.map(|o| o.label().to_string()).unwrap_or_default(),
        v.value.map(format_value).unwrap_or_default(),
    ]
}

/// Footer line: last refresh time, schedule and market state.
pub fn render_status(
    last_updated: Option<DateTime<Local>>,
    interval: RefreshInterval,
    market_open: bool,
) -> String {
    let updated = last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let market = if market_open { "open" } else { "closed" };
    format!("Last updated: {updated} | Refresh: {interval} | Market: {market}")
}
