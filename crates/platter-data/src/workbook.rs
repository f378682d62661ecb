//! Raw workbook access.
//!
//! A [`Workbook`] is a list of [`Sheet`]s, each a header row plus a grid of
//! loosely typed [`Cell`]s. Spreadsheets are read with `calamine`; a `.csv`
//! file is treated as a workbook holding a single sheet named after the file.

use crate::error::{DataError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell
    Empty,
    /// Numeric cell
    Number(f64),
    /// Text cell (may still hold a formatted number such as `"$1,200"`)
    Text(String),
    /// Boolean cell
    Bool(bool),
}

impl Cell {
    /// True for blank cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// Render the cell as trimmed text, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::String(s) => Self::Text(s.clone()),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(dt) => Self::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Error(e) => Self::Text(format!("{e:?}")),
            Data::Empty => Self::Empty,
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// A named sheet: header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet name as it appears in the workbook
    pub name: String,
    /// Trimmed header labels
    pub headers: Vec<String>,
    /// Data rows below the header
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create a sheet from explicit headers and rows.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Build a sheet from a raw grid.
    ///
    /// The first non-blank row is the header. Fully blank rows are dropped.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>) -> Self {
        let mut rows = grid
            .into_iter()
            .filter(|row| !row.iter().all(Cell::is_empty));

        let headers = rows
            .next()
            .map(|row| {
                row.iter()
                    .map(|c| c.as_text().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        Self::new(name, headers, rows.collect())
    }

    /// Find a column by header, ignoring case and surrounding whitespace.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let wanted = header.trim();
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
    }

    /// Cell at (row, column); out-of-range positions read as blank.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// An opened workbook.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Open a workbook or CSV export from disk.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or when the extension is
    /// not a supported format.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let workbook = match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::open_spreadsheet(path)?,
            "csv" => Self::open_csv(path)?,
            other => return Err(DataError::UnsupportedFormat(other.to_string())),
        };

        if workbook.sheets.is_empty() {
            return Err(DataError::EmptyWorkbook(path.display().to_string()));
        }

        tracing::debug!(
            path = %path.display(),
            sheets = workbook.sheets.len(),
            "opened workbook"
        );
        Ok(workbook)
    }

    fn open_spreadsheet(path: &Path) -> Result<Self> {
        let mut source = open_workbook_auto(path)?;
        let mut sheets = Vec::new();

        for name in source.sheet_names() {
            let range = source.worksheet_range(&name)?;
            let grid = range
                .rows()
                .map(|row| row.iter().map(Cell::from).collect())
                .collect();
            sheets.push(Sheet::from_grid(name, grid));
        }

        Ok(Self { sheets })
    }

    fn open_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut grid = Vec::new();
        for record in reader.records() {
            let record = record?;
            grid.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();

        Ok(Self {
            sheets: vec![Sheet::from_grid(name, grid)],
        })
    }

    /// Build a workbook from in-memory sheets.
    pub const fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Names of all sheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a sheet by name, ignoring case and surrounding whitespace.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let wanted = name.trim();
        self.sheets
            .iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(wanted))
    }

    /// First sheet in the workbook.
    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// True when the workbook holds no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_from_grid_skips_blank_rows() {
        let grid = vec![
            vec![Cell::Empty, Cell::Empty],
            vec![text(" Brand Name "), text("Annualized Trips")],
            vec![text("Alpha"), Cell::Number(100.0)],
            vec![Cell::Empty, text("  ")],
            vec![text("Beta"), Cell::Number(200.0)],
        ];

        let sheet = Sheet::from_grid("Brands", grid);
        assert_eq!(sheet.headers, vec!["Brand Name", "Annualized Trips"]);
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.cell(1, 0), &text("Beta"));
    }

    #[test]
    fn test_column_index_is_case_insensitive() {
        let sheet = Sheet::new(
            "Brands",
            vec!["Brand Name".to_string(), "Order Defect Rate".to_string()],
            vec![],
        );
        assert_eq!(sheet.column_index("order defect rate"), Some(1));
        assert_eq!(sheet.column_index(" BRAND NAME "), Some(0));
        assert_eq!(sheet.column_index("Marketplace Fee"), None);
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let sheet = Sheet::new("S", vec!["A".to_string()], vec![vec![Cell::Number(1.0)]]);
        assert_eq!(sheet.cell(0, 5), &Cell::Empty);
        assert_eq!(sheet.cell(9, 0), &Cell::Empty);
    }

    #[test]
    fn test_sheet_lookup_ignores_case() {
        let workbook = Workbook::from_sheets(vec![
            Sheet::new("Restaurant Brands Dataset", vec![], vec![]),
            Sheet::new("Demographic Data", vec![], vec![]),
        ]);
        assert!(workbook.sheet("demographic data").is_some());
        assert!(workbook.sheet("Missing").is_none());
        assert_eq!(workbook.len(), 2);
        assert_eq!(
            workbook.first_sheet().map(|s| s.name.as_str()),
            Some("Restaurant Brands Dataset")
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Workbook::open("brands.parquet").unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(ext) if ext == "parquet"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Workbook::open("/nonexistent/brands.csv").is_err());
    }
}
