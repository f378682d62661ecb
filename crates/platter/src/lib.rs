#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/platter/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod session;

// Re-export main types from sub-crates
pub use platter_data as data;
pub use platter_economics as economics;
pub use platter_output as output;
pub use platter_scoring as scoring;

pub use dashboard::{
    Dashboard, DemographicJoin, FeeSimulator, JoinedBrand, MerchantScoring, Overview,
    RevenueImpact, UnitEconomicsPage,
};
pub use error::{PlatterError, Result};
pub use session::{SESSION_FILE, Session};

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
