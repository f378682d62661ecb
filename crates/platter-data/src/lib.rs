#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/platter/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod brands;
pub mod clean;
pub mod dataset;
pub mod demographics;
pub mod error;
pub mod issues;
pub mod summary;
pub mod workbook;

pub use brands::{BrandField, BrandRecord, BrandTable, NAME_HEADER, Segment};
pub use dataset::{BRAND_SHEET, DEMOGRAPHIC_SHEET, Dataset, LoadOptions};
pub use demographics::{DemographicMatch, DemographicTable, DemographicValue};
pub use error::{DataError, Result};
pub use issues::{IssueKind, LoadIssue, LoadReport};
pub use summary::DataSummary;
pub use workbook::{Cell, Sheet, Workbook};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
