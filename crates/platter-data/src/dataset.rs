//! Loading the two-sheet workbook into a [`Dataset`].

use crate::brands::{BrandRecord, BrandTable, Segment};
use crate::demographics::DemographicTable;
use crate::error::{DataError, Result};
use crate::issues::{IssueKind, LoadIssue, LoadReport};
use crate::summary::DataSummary;
use crate::workbook::Workbook;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the brand sheet.
pub const BRAND_SHEET: &str = "Restaurant Brands Dataset";

/// Default name of the demographic sheet.
pub const DEMOGRAPHIC_SHEET: &str = "Demographic Data";

/// Options controlling how a workbook is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Brand sheet name (default: "Restaurant Brands Dataset")
    pub brand_sheet: String,
    /// Demographic sheet name (default: "Demographic Data")
    pub demographic_sheet: String,
    /// Active locations at which a brand counts as enterprise (default: 20)
    pub enterprise_threshold: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            brand_sheet: BRAND_SHEET.to_string(),
            demographic_sheet: DEMOGRAPHIC_SHEET.to_string(),
            enterprise_threshold: 20.0,
        }
    }
}

/// Cleaned brand and demographic tables plus everything noticed on the way.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Brand metrics
    pub brands: BrandTable,
    /// Demographic data (empty when the sheet is absent)
    pub demographics: DemographicTable,
    /// Non-fatal problems found while loading
    pub report: LoadReport,
    /// Enterprise threshold used for [`Dataset::segment_of`]
    pub enterprise_threshold: f64,
    /// Source file, when loaded from disk
    pub source: Option<PathBuf>,
}

impl Dataset {
    /// Read a workbook (or CSV export) from disk.
    ///
    /// # Errors
    ///
    /// Only an unreadable file is fatal; everything else lands in
    /// [`Dataset::report`].
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let workbook = Workbook::open(path)?;
        let mut dataset = Self::from_workbook(&workbook, options)?;
        dataset.source = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            brands = dataset.brands.len(),
            demographic_rows = dataset.demographics.len(),
            issues = dataset.report.issues.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Build a dataset from an opened workbook.
    ///
    /// A missing brand sheet falls back to the first sheet; a missing
    /// demographic sheet yields an empty table. Both are recorded as
    /// [`IssueKind::MissingSheet`].
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyWorkbook`] when the workbook has no sheets.
    pub fn from_workbook(workbook: &Workbook, options: &LoadOptions) -> Result<Self> {
        let mut report = LoadReport::new();

        let brand_sheet = match workbook.sheet(&options.brand_sheet) {
            Some(sheet) => sheet,
            None => {
                let sheet = workbook
                    .first_sheet()
                    .ok_or_else(|| DataError::EmptyWorkbook(options.brand_sheet.clone()))?;
                report.push(LoadIssue::new(
                    IssueKind::MissingSheet,
                    None,
                    None,
                    format!(
                        "sheet '{}' not found; using '{}'",
                        options.brand_sheet, sheet.name
                    ),
                ));
                sheet
            }
        };

        let (brands, brand_report) = BrandTable::from_sheet(brand_sheet);
        report.merge(brand_report);

        let demographics = match workbook.sheet(&options.demographic_sheet) {
            Some(sheet) => DemographicTable::from_sheet(sheet),
            None => {
                report.push(LoadIssue::new(
                    IssueKind::MissingSheet,
                    None,
                    None,
                    format!(
                        "sheet '{}' not found; demographic data unavailable",
                        options.demographic_sheet
                    ),
                ));
                DemographicTable::empty()
            }
        };

        Ok(Self {
            brands,
            demographics,
            report,
            enterprise_threshold: options.enterprise_threshold,
            source: None,
        })
    }

    /// Wrap an in-memory brand table.
    pub fn from_brands(brands: BrandTable) -> Self {
        Self {
            brands,
            enterprise_threshold: LoadOptions::default().enterprise_threshold,
            ..Self::default()
        }
    }

    /// Segment of a brand under this dataset's threshold.
    pub fn segment_of(&self, record: &BrandRecord) -> Segment {
        record.segment(self.enterprise_threshold)
    }

    /// Shape and fill summary.
    pub fn summary(&self) -> DataSummary {
        DataSummary::from_dataset(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::{BrandField, NAME_HEADER};
    use crate::workbook::{Cell, Sheet};

    fn brand_sheet(name: &str) -> Sheet {
        let headers = std::iter::once(NAME_HEADER)
            .chain(BrandField::ALL.iter().map(BrandField::header))
            .map(str::to_string)
            .collect();
        let row = |brand: &str, active: f64| {
            let mut cells = vec![Cell::Text(brand.to_string())];
            cells.extend([
                Cell::Number(1000.0),
                Cell::Number(active),
                Cell::Number(50.0),
                Cell::Number(0.4),
                Cell::Number(20.0),
                Cell::Number(0.2),
                Cell::Number(0.1),
                Cell::Number(0.03),
                Cell::Number(4.0),
            ]);
            cells
        };
        Sheet::new(name, headers, vec![row("Alpha", 30.0), row("Beta", 5.0)])
    }

    #[test]
    fn test_named_sheets() {
        let workbook = Workbook::from_sheets(vec![
            brand_sheet(BRAND_SHEET),
            Sheet::new(
                DEMOGRAPHIC_SHEET,
                vec!["Brand".into()],
                vec![vec![Cell::Text("Alpha".into())]],
            ),
        ]);

        let dataset = Dataset::from_workbook(&workbook, &LoadOptions::default()).unwrap();
        assert!(dataset.report.is_clean());
        assert_eq!(dataset.brands.len(), 2);
        assert_eq!(dataset.demographics.len(), 1);
    }

    #[test]
    fn test_fallbacks_are_reported() {
        let workbook = Workbook::from_sheets(vec![brand_sheet("Sheet1")]);

        let dataset = Dataset::from_workbook(&workbook, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.brands.len(), 2);
        assert!(dataset.demographics.is_empty());
        assert_eq!(dataset.report.count(IssueKind::MissingSheet), 2);
    }

    #[test]
    fn test_empty_workbook() {
        let workbook = Workbook::from_sheets(vec![]);
        let err = Dataset::from_workbook(&workbook, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::EmptyWorkbook(_)));
    }

    #[test]
    fn test_segments() {
        let workbook = Workbook::from_sheets(vec![brand_sheet(BRAND_SHEET)]);
        let options = LoadOptions {
            enterprise_threshold: 25.0,
            ..LoadOptions::default()
        };
        let dataset = Dataset::from_workbook(&workbook, &options).unwrap();
        let records = dataset.brands.records();
        assert_eq!(dataset.segment_of(&records[0]), Segment::Enterprise);
        assert_eq!(dataset.segment_of(&records[1]), Segment::Smb);

        let single = Dataset::from_brands(BrandTable::new(vec![BrandRecord::named("Z")]));
        assert_eq!(single.enterprise_threshold, 20.0);
    }

    #[test]
    fn test_summary_counts_filled_cells() {
        let mut sheet = brand_sheet(BRAND_SHEET);
        sheet.rows[1][1] = Cell::Text("n/a".into());
        let workbook = Workbook::from_sheets(vec![sheet]);

        let summary = Dataset::from_workbook(&workbook, &LoadOptions::default())
            .unwrap()
            .summary();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns.len(), 10);
        assert_eq!(summary.missing_values["Annualized Trips"], 1);
        assert_eq!(summary.total_missing(), 1);
    }
}
