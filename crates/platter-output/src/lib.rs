#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/platter/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod methodology;
pub mod report;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, ScoreExport, ScoredBrands};
pub use methodology::{METHODOLOGY, methodology};
pub use report::{Report, ReportBuilder, ReportError, ReportSection};
pub use summary::{TierRevenue, TierSummary, TierSummaryRow};
