//! Cell cleaning.
//!
//! Exported sheets carry numbers as formatted text: currency with `$` and
//! thousands separators, percentages with a trailing `%`, counts with commas.
//! These helpers turn such cells into plain `f64` values.

use crate::workbook::Cell;

/// How a numeric column is formatted in the source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Integer counts, possibly with thousands separators
    Count,
    /// Currency amounts such as `$18.40`
    Currency,
    /// Rates stored as `23%`, `0.23` or `23`
    Fraction,
    /// Any other number
    Plain,
}

/// Parse a cell as a number.
///
/// Returns `None` for blank or unparseable cells and for non-finite values.
/// Fractions written as percentages (`"23%"`, or bare numbers above 1) are
/// divided by 100.
pub fn parse_number(cell: &Cell, kind: ValueKind) -> Option<f64> {
    let (value, had_percent) = match cell {
        Cell::Empty | Cell::Bool(_) => return None,
        Cell::Number(n) => (*n, false),
        Cell::Text(s) => parse_text(s)?,
    };

    if !value.is_finite() {
        return None;
    }

    let value = match kind {
        ValueKind::Fraction if had_percent || value > 1.0 => value / 100.0,
        _ if had_percent => value / 100.0,
        _ => value,
    };

    Some(value)
}

fn parse_text(raw: &str) -> Option<(f64, bool)> {
    let had_percent = raw.contains('%');
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().map(|v| (v, had_percent))
}

/// Median of a set of values; `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
