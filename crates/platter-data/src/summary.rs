//! Shape summary of the loaded brand data.

use crate::brands::{BrandField, NAME_HEADER};
use crate::dataset::Dataset;
use crate::issues::IssueKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Row count, columns and per-column count of values that had to be filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSummary {
    /// Brands retained after cleaning
    pub rows: usize,
    /// Column headers of the brand table
    pub columns: Vec<String>,
    /// Blank, non-numeric or negative cells per column
    pub missing_values: BTreeMap<String, usize>,
    /// Demographic rows
    pub demographic_rows: usize,
}

impl DataSummary {
    /// Summarize a dataset.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let columns: Vec<String> = std::iter::once(NAME_HEADER)
            .chain(
                BrandField::ALL
                    .iter()
                    .filter(|f| dataset.brands.is_available(**f))
                    .map(BrandField::header),
            )
            .map(str::to_string)
            .collect();

        let mut missing_values: BTreeMap<String, usize> =
            columns.iter().map(|c| (c.clone(), 0)).collect();
        for issue in &dataset.report.issues {
            let filled = matches!(
                issue.kind,
                IssueKind::MissingValue | IssueKind::NonNumeric | IssueKind::NegativeValue
            );
            if let (true, Some(column)) = (filled, &issue.column) {
                *missing_values.entry(column.clone()).or_default() += 1;
            }
        }

        Self {
            rows: dataset.brands.len(),
            columns,
            missing_values,
            demographic_rows: dataset.demographics.len(),
        }
    }

    /// Total number of filled cells.
    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }
}

impl fmt::Display for DataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Brands:            {}", self.rows)?;
        writeln!(f, "Demographic rows:  {}", self.demographic_rows)?;
        writeln!(f, "Columns:           {}", self.columns.len())?;
        for (column, count) in &self.missing_values {
            if *count > 0 {
                writeln!(f, "  {column:<36} {count} filled")?;
            }
        }
        Ok(())
    }
}
