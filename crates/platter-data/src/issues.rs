//! Non-fatal load problems.

use serde::Serialize;
use std::fmt;

/// Category of a load problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Expected sheet not found; a fallback was used
    MissingSheet,
    /// Expected column not found in the header
    MissingColumn,
    /// Cell could not be read as a number; median substituted
    NonNumeric,
    /// Cell was blank; median substituted
    MissingValue,
    /// Negative value where only non-negative values make sense; median substituted
    NegativeValue,
    /// Active locations exceed total locations; clamped
    LocationMismatch,
    /// Row without a brand name; excluded
    MissingName,
    /// Brand name already seen; row excluded
    DuplicateBrand,
}

impl IssueKind {
    /// True when the issue caused a row to be dropped.
    pub const fn excludes_row(&self) -> bool {
        matches!(self, Self::MissingName | Self::DuplicateBrand)
    }
}

/// A single load problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadIssue {
    /// Problem category
    pub kind: IssueKind,
    /// Spreadsheet row number (header is row 1), when row specific
    pub row: Option<usize>,
    /// Column header, when column specific
    pub column: Option<String>,
    /// Human readable description
    pub message: String,
}

impl LoadIssue {
    /// Create an issue.
    pub fn new(
        kind: IssueKind,
        row: Option<usize>,
        column: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            row,
            column: column.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row, &self.column) {
            (Some(row), Some(column)) => write!(f, "row {row}, {column}: {}", self.message),
            (Some(row), None) => write!(f, "row {row}: {}", self.message),
            (None, Some(column)) => write!(f, "{column}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

/// Everything that went wrong (non-fatally) while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// All recorded issues, in discovery order
    pub issues: Vec<LoadIssue>,
    /// Data rows read from the sheet
    pub rows_read: usize,
    /// Rows dropped (missing name or duplicate)
    pub rows_excluded: usize,
}

impl LoadReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue and emit it as a warning.
    pub fn push(&mut self, issue: LoadIssue) {
        tracing::warn!(kind = ?issue.kind, "{issue}");
        if issue.kind.excludes_row() {
            self.rows_excluded += 1;
        }
        self.issues.push(issue);
    }

    /// Number of issues of a given kind.
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// True when nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Append another report's issues and counters.
    pub fn merge(&mut self, other: Self) {
        self.rows_read += other.rows_read;
        self.rows_excluded += other.rows_excluded;
        self.issues.extend(other.issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_counts_exclusions() {
        let mut report = LoadReport::new();
        report.push(LoadIssue::new(
            IssueKind::MissingName,
            Some(4),
            None,
            "row has no brand name",
        ));
        report.push(LoadIssue::new(
            IssueKind::NonNumeric,
            Some(5),
            Some("Annualized Trips"),
            "'abc' is not a number",
        ));

        assert_eq!(report.rows_excluded, 1);
        assert_eq!(report.count(IssueKind::NonNumeric), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_display() {
        let issue = LoadIssue::new(
            IssueKind::MissingColumn,
            None,
            Some("Marketplace Fee"),
            "column not found",
        );
        assert_eq!(issue.to_string(), "Marketplace Fee: column not found");

        let issue = LoadIssue::new(IssueKind::DuplicateBrand, Some(7), None, "duplicate 'Alpha'");
        assert_eq!(issue.to_string(), "row 7: duplicate 'Alpha'");
    }

    #[test]
    fn test_merge() {
        let mut a = LoadReport {
            rows_read: 3,
            ..LoadReport::default()
        };
        let mut b = LoadReport::new();
        b.rows_read = 2;
        b.push(LoadIssue::new(IssueKind::MissingSheet, None, None, "fallback"));

        a.merge(b);
        assert_eq!(a.rows_read, 5);
        assert_eq!(a.issues.len(), 1);
    }
}
