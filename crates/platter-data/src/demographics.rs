//! Auxiliary demographic table.
//!
//! The demographic sheet has no fixed schema. Each column is typed by its
//! contents: numeric when every non-blank cell parses as a number, text
//! otherwise. Blank numeric cells take the column median, blank text cells
//! take `"Unknown"`.

use crate::brands::BrandTable;
use crate::clean::{ValueKind, median, parse_number};
use crate::error::{DataError, Result};
use crate::workbook::Sheet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Placeholder for blank text cells.
pub const UNKNOWN: &str = "Unknown";

/// A single demographic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DemographicValue {
    /// Numeric value
    Number(f64),
    /// Free text
    Text(String),
}

impl DemographicValue {
    /// Numeric value, if any.
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for DemographicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One brand matched to a demographic row.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicMatch<'a> {
    /// Brand name as it appears in the brand table
    pub brand: &'a str,
    /// Matching demographic row
    pub row: &'a [DemographicValue],
}

/// Demographic data keyed by column header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemographicTable {
    /// Column headers
    pub headers: Vec<String>,
    /// Cleaned rows, one value per header
    pub rows: Vec<Vec<DemographicValue>>,
}

impl DemographicTable {
    /// An empty table, used when the sheet is absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and clean a demographic sheet.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let width = sheet.headers.len();
        let mut columns: Vec<Vec<DemographicValue>> = Vec::with_capacity(width);

        for col in 0..width {
            let cells: Vec<_> = (0..sheet.height()).map(|row| sheet.cell(row, col)).collect();
            let numbers: Vec<Option<f64>> = cells
                .iter()
                .map(|c| parse_number(c, ValueKind::Plain))
                .collect();
            let numeric = cells
                .iter()
                .zip(&numbers)
                .all(|(cell, n)| cell.is_empty() || n.is_some());

            let column = if numeric {
                let present: Vec<f64> = numbers.iter().flatten().copied().collect();
                let fill = median(&present).unwrap_or(0.0);
                numbers
                    .iter()
                    .map(|n| DemographicValue::Number(n.unwrap_or(fill)))
                    .collect()
            } else {
                cells
                    .iter()
                    .map(|c| {
                        DemographicValue::Text(c.as_text().unwrap_or_else(|| UNKNOWN.to_string()))
                    })
                    .collect()
            };
            columns.push(column);
        }

        let rows = (0..sheet.height())
            .map(|row| columns.iter().map(|c| c[row].clone()).collect())
            .collect();

        tracing::debug!(
            sheet = %sheet.name,
            rows = sheet.height(),
            columns = width,
            "parsed demographic sheet"
        );

        Self {
            headers: sheet.headers.clone(),
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, ignoring case and surrounding whitespace.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let wanted = header.trim();
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    }

    /// All values of one column.
    pub fn column(&self, header: &str) -> Option<Vec<&DemographicValue>> {
        let idx = self.column_index(header)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Match brands to demographic rows on a named key column.
    ///
    /// Keys are compared trimmed and case-insensitively. Brands without a
    /// matching row are left out; when a key repeats, the first row wins.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingColumn`] when `key` is not a column.
    pub fn join_on<'a>(
        &'a self,
        key: &str,
        brands: &'a BrandTable,
    ) -> Result<Vec<DemographicMatch<'a>>> {
        let idx = self
            .column_index(key)
            .ok_or_else(|| DataError::MissingColumn(key.to_string()))?;

        let mut lookup: HashMap<String, &[DemographicValue]> = HashMap::new();
        for row in &self.rows {
            let value = row[idx].to_string().trim().to_lowercase();
            lookup.entry(value).or_insert(row.as_slice());
        }

        let matches: Vec<_> = brands
            .records()
            .iter()
            .filter_map(|record| {
                lookup
                    .get(&record.name.trim().to_lowercase())
                    .copied()
                    .map(|row| DemographicMatch {
                        brand: record.name.as_str(),
                        row,
                    })
            })
            .collect();

        tracing::debug!(
            key,
            matched = matches.len(),
            brands = brands.len(),
            "joined demographics"
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::BrandRecord;
    use crate::workbook::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sheet() -> Sheet {
        Sheet::new(
            "Demographic Data",
            vec!["Brand".into(), "Median Income".into(), "Region".into()],
            vec![
                vec![text("Alpha"), Cell::Number(50_000.0), text("West")],
                vec![text("beta "), Cell::Empty, Cell::Empty],
                vec![text("Gamma"), text("$70,000"), text("East")],
            ],
        )
    }

    #[test]
    fn test_fill_rules() {
        let table = DemographicTable::from_sheet(&sheet());
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1][1], DemographicValue::Number(60_000.0));
        assert_eq!(table.rows[1][2], DemographicValue::Text(UNKNOWN.to_string()));
    }

    #[test]
    fn test_mixed_column_is_text() {
        let sheet = Sheet::new(
            "D",
            vec!["Code".into()],
            vec![vec![Cell::Number(1.0)], vec![text("X1")]],
        );
        let table = DemographicTable::from_sheet(&sheet);
        assert_eq!(table.rows[0][0], DemographicValue::Text("1".into()));
        assert_eq!(table.rows[0][0].as_f64(), None);
    }

    #[test]
    fn test_join_is_case_insensitive() {
        let table = DemographicTable::from_sheet(&sheet());
        let brands = BrandTable::new(vec![
            BrandRecord::named("ALPHA"),
            BrandRecord::named("Beta"),
            BrandRecord::named("Delta"),
        ]);

        let matches = table.join_on("brand", &brands).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].brand, "ALPHA");
        assert_eq!(matches[0].row[2], DemographicValue::Text("West".into()));
        assert_eq!(matches[1].brand, "Beta");
    }

    #[test]
    fn test_join_on_missing_key() {
        let table = DemographicTable::from_sheet(&sheet());
        let brands = BrandTable::default();
        let err = table.join_on("Brand Name", &brands).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "Brand Name"));
    }
}
