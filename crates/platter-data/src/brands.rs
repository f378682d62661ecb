//! Brand records and the brand table.
//!
//! The brand sheet has a fixed schema: `Brand Name` plus nine numeric
//! columns (see [`BrandField`]). Loading never fails on bad cells. Blank,
//! non-numeric and negative values are replaced with the column median and
//! recorded in the [`LoadReport`]; rows without a name and duplicate brands
//! are dropped.

use crate::clean::{ValueKind, median, parse_number};
use crate::error::Result;
use crate::issues::{IssueKind, LoadIssue, LoadReport};
use crate::workbook::Sheet;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Header of the key column.
pub const NAME_HEADER: &str = "Brand Name";

/// Numeric columns of the brand sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandField {
    /// Annualized trip (order) volume
    AnnualTrips,
    /// Locations currently taking orders
    ActiveLocations,
    /// All locations on the platform
    TotalLocations,
    /// Share of locations that are franchised
    FranchiseShare,
    /// Average basket size in currency
    BasketSize,
    /// Marketplace commission rate
    MarketplaceFee,
    /// Share of orders from first-time eaters
    FirstTimeShare,
    /// Order defect rate
    DefectRate,
    /// Average courier wait time in minutes
    CourierWait,
}

impl BrandField {
    /// All numeric fields in sheet order.
    pub const ALL: [Self; 9] = [
        Self::AnnualTrips,
        Self::ActiveLocations,
        Self::TotalLocations,
        Self::FranchiseShare,
        Self::BasketSize,
        Self::MarketplaceFee,
        Self::FirstTimeShare,
        Self::DefectRate,
        Self::CourierWait,
    ];

    /// Column header in the source sheet.
    pub const fn header(&self) -> &'static str {
        match self {
            Self::AnnualTrips => "Annualized Trips",
            Self::ActiveLocations => "Active Locations",
            Self::TotalLocations => "Total Locations",
            Self::FranchiseShare => "% Franchised",
            Self::BasketSize => "Avg. Basket Size",
            Self::MarketplaceFee => "Marketplace Fee",
            Self::FirstTimeShare => "%Orders from First Time Eaters",
            Self::DefectRate => "Order Defect Rate",
            Self::CourierWait => "Avg. Courier Wait Time (min)",
        }
    }

    /// Column name in the polars frame.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::AnnualTrips => "annual_trips",
            Self::ActiveLocations => "active_locations",
            Self::TotalLocations => "total_locations",
            Self::FranchiseShare => "franchise_share",
            Self::BasketSize => "basket_size",
            Self::MarketplaceFee => "marketplace_fee",
            Self::FirstTimeShare => "first_time_share",
            Self::DefectRate => "defect_rate",
            Self::CourierWait => "courier_wait_minutes",
        }
    }

    /// Source formatting of the column.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::AnnualTrips | Self::ActiveLocations | Self::TotalLocations => ValueKind::Count,
            Self::BasketSize => ValueKind::Currency,
            Self::FranchiseShare
            | Self::MarketplaceFee
            | Self::FirstTimeShare
            | Self::DefectRate => ValueKind::Fraction,
            Self::CourierWait => ValueKind::Plain,
        }
    }
}

impl fmt::Display for BrandField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Merchant size segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Multi-location brand at or above the enterprise threshold
    Enterprise,
    /// Small or medium business
    #[serde(rename = "SMB")]
    Smb,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enterprise => f.pad("Enterprise"),
            Self::Smb => f.pad("SMB"),
        }
    }
}

/// One restaurant brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRecord {
    /// Brand name (unique key)
    pub name: String,
    /// Annualized trips
    pub annual_trips: f64,
    /// Active locations
    pub active_locations: f64,
    /// Total locations
    pub total_locations: f64,
    /// Franchised share, 0–1
    pub franchise_share: f64,
    /// Average basket size
    pub basket_size: f64,
    /// Marketplace fee rate, 0–1
    pub marketplace_fee: f64,
    /// First-time order share, 0–1
    pub first_time_share: f64,
    /// Order defect rate, 0–1
    pub defect_rate: f64,
    /// Average courier wait, minutes
    pub courier_wait_minutes: f64,
}

impl BrandRecord {
    /// Create a record with every metric set to zero.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annual_trips: 0.0,
            active_locations: 0.0,
            total_locations: 0.0,
            franchise_share: 0.0,
            basket_size: 0.0,
            marketplace_fee: 0.0,
            first_time_share: 0.0,
            defect_rate: 0.0,
            courier_wait_minutes: 0.0,
        }
    }

    /// Read a metric by field.
    pub const fn get(&self, field: BrandField) -> f64 {
        match field {
            BrandField::AnnualTrips => self.annual_trips,
            BrandField::ActiveLocations => self.active_locations,
            BrandField::TotalLocations => self.total_locations,
            BrandField::FranchiseShare => self.franchise_share,
            BrandField::BasketSize => self.basket_size,
            BrandField::MarketplaceFee => self.marketplace_fee,
            BrandField::FirstTimeShare => self.first_time_share,
            BrandField::DefectRate => self.defect_rate,
            BrandField::CourierWait => self.courier_wait_minutes,
        }
    }

    /// Write a metric by field.
    pub const fn set(&mut self, field: BrandField, value: f64) {
        match field {
            BrandField::AnnualTrips => self.annual_trips = value,
            BrandField::ActiveLocations => self.active_locations = value,
            BrandField::TotalLocations => self.total_locations = value,
            BrandField::FranchiseShare => self.franchise_share = value,
            BrandField::BasketSize => self.basket_size = value,
            BrandField::MarketplaceFee => self.marketplace_fee = value,
            BrandField::FirstTimeShare => self.first_time_share = value,
            BrandField::DefectRate => self.defect_rate = value,
            BrandField::CourierWait => self.courier_wait_minutes = value,
        }
    }

    /// Builder-style setter, mostly for fixtures.
    pub fn with(mut self, field: BrandField, value: f64) -> Self {
        self.set(field, value);
        self
    }

    /// Marketplace revenue per order: basket × fee.
    pub fn revenue_per_order(&self) -> f64 {
        self.basket_size * self.marketplace_fee
    }

    /// Active share of total locations; 0 when there are no locations.
    pub fn location_activation_rate(&self) -> f64 {
        if self.total_locations > 0.0 {
            self.active_locations / self.total_locations
        } else {
            0.0
        }
    }

    /// More than half of locations are franchised.
    pub fn is_franchised(&self) -> bool {
        self.franchise_share > 0.5
    }

    /// Enterprise when active locations reach `threshold`.
    pub fn segment(&self, threshold: f64) -> Segment {
        if self.active_locations >= threshold {
            Segment::Enterprise
        } else {
            Segment::Smb
        }
    }
}

/// The cleaned brand table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandTable {
    records: Vec<BrandRecord>,
    missing_fields: Vec<BrandField>,
}

impl BrandTable {
    /// Wrap already-clean records; every field counts as present.
    pub const fn new(records: Vec<BrandRecord>) -> Self {
        Self {
            records,
            missing_fields: Vec::new(),
        }
    }

    /// Parse the brand sheet.
    pub fn from_sheet(sheet: &Sheet) -> (Self, LoadReport) {
        let mut report = LoadReport::new();
        report.rows_read = sheet.height();

        let name_idx = sheet.column_index(NAME_HEADER);
        if name_idx.is_none() {
            report.push(LoadIssue::new(
                IssueKind::MissingColumn,
                None,
                Some(NAME_HEADER),
                "column not found; rows are named by position",
            ));
        }

        let mut missing_fields = Vec::new();
        let columns: Vec<(BrandField, Option<usize>)> = BrandField::ALL
            .iter()
            .map(|&field| {
                let idx = sheet.column_index(field.header());
                if idx.is_none() {
                    report.push(LoadIssue::new(
                        IssueKind::MissingColumn,
                        None,
                        Some(field.header()),
                        "column not found; metric unavailable",
                    ));
                    missing_fields.push(field);
                }
                (field, idx)
            })
            .collect();

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut raw: Vec<[Option<f64>; 9]> = Vec::new();

        for row in 0..sheet.height() {
            let sheet_row = row + 2;

            let name = match name_idx {
                Some(idx) => sheet.cell(row, idx).as_text(),
                None => Some(format!("Row {sheet_row}")),
            };
            let Some(name) = name else {
                report.push(LoadIssue::new(
                    IssueKind::MissingName,
                    Some(sheet_row),
                    Some(NAME_HEADER),
                    "row has no brand name; excluded",
                ));
                continue;
            };
            if !seen.insert(name.to_lowercase()) {
                report.push(LoadIssue::new(
                    IssueKind::DuplicateBrand,
                    Some(sheet_row),
                    Some(NAME_HEADER),
                    format!("duplicate brand '{name}'; excluded"),
                ));
                continue;
            }

            let mut values = [None; 9];
            for (slot, (field, idx)) in values.iter_mut().zip(&columns) {
                let Some(idx) = idx else { continue };
                let cell = sheet.cell(row, *idx);
                *slot = match parse_number(cell, field.kind()) {
                    Some(v) if v < 0.0 => {
                        report.push(LoadIssue::new(
                            IssueKind::NegativeValue,
                            Some(sheet_row),
                            Some(field.header()),
                            format!("negative value {v}; median substituted"),
                        ));
                        None
                    }
                    Some(v) => Some(v),
                    None if cell.is_empty() => {
                        report.push(LoadIssue::new(
                            IssueKind::MissingValue,
                            Some(sheet_row),
                            Some(field.header()),
                            "blank cell; median substituted",
                        ));
                        None
                    }
                    None => {
                        report.push(LoadIssue::new(
                            IssueKind::NonNumeric,
                            Some(sheet_row),
                            Some(field.header()),
                            format!(
                                "'{}' is not a number; median substituted",
                                cell.as_text().unwrap_or_default()
                            ),
                        ));
                        None
                    }
                };
            }

            names.push((name, sheet_row));
            raw.push(values);
        }

        let medians: Vec<f64> = (0..BrandField::ALL.len())
            .map(|i| {
                let present: Vec<f64> = raw.iter().filter_map(|v| v[i]).collect();
                median(&present).unwrap_or(0.0)
            })
            .collect();

        let location_check = !missing_fields.contains(&BrandField::ActiveLocations)
            && !missing_fields.contains(&BrandField::TotalLocations);

        let records = names
            .into_iter()
            .zip(raw)
            .map(|((name, sheet_row), values)| {
                let mut record = BrandRecord::named(name);
                for (i, field) in BrandField::ALL.iter().enumerate() {
                    record.set(*field, values[i].unwrap_or(medians[i]));
                }

                if location_check && record.active_locations > record.total_locations {
                    report.push(LoadIssue::new(
                        IssueKind::LocationMismatch,
                        Some(sheet_row),
                        Some(BrandField::ActiveLocations.header()),
                        format!(
                            "active locations {} exceed total {}; clamped",
                            record.active_locations, record.total_locations
                        ),
                    ));
                    record.active_locations = record.total_locations;
                }
                record
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            sheet = %sheet.name,
            brands = records.len(),
            issues = report.issues.len(),
            "parsed brand sheet"
        );

        (
            Self {
                records,
                missing_fields,
            },
            report,
        )
    }

    /// All records, in sheet order.
    pub fn records(&self) -> &[BrandRecord] {
        &self.records
    }

    /// Number of brands.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no brands.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a brand by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&BrandRecord> {
        let wanted = name.trim();
        self.records
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(wanted))
    }

    /// Fields whose column was absent from the source sheet.
    pub fn missing_fields(&self) -> &[BrandField] {
        &self.missing_fields
    }

    /// True when the field's column was present in the source sheet.
    pub fn is_available(&self, field: BrandField) -> bool {
        !self.missing_fields.contains(&field)
    }

    /// Columnar view: `name` plus one `f64` column per [`BrandField`].
    ///
    /// # Errors
    ///
    /// Propagates polars construction errors.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(BrandField::ALL.len() + 1);
        columns.push(Column::new(
            "name".into(),
            self.records
                .iter()
                .map(|r| r.name.clone())
                .collect::<Vec<_>>(),
        ));
        for field in BrandField::ALL {
            columns.push(Column::new(
                field.column().into(),
                self.records
                    .iter()
                    .map(|r| r.get(field))
                    .collect::<Vec<_>>(),
            ));
        }

        Ok(DataFrame::new(columns)?)
    }
}

impl FromIterator<BrandRecord> for BrandTable {
    fn from_iter<T: IntoIterator<Item = BrandRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Cell;

    fn headers() -> Vec<String> {
        std::iter::once(NAME_HEADER)
            .chain(BrandField::ALL.iter().map(BrandField::header))
            .map(str::to_string)
            .collect()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn row(name: &str, values: [&str; 9]) -> Vec<Cell> {
        std::iter::once(text(name))
            .chain(values.iter().map(|v| text(v)))
            .collect()
    }

    #[test]
    fn test_parses_formatted_cells() {
        let sheet = Sheet::new(
            "Restaurant Brands Dataset",
            headers(),
            vec![row(
                "Alpha Burgers",
                ["1,204,000", "40", "45", "60%", "$24.50", "22%", "12%", "3.5%", "4.2"],
            )],
        );

        let (table, report) = BrandTable::from_sheet(&sheet);
        assert!(report.is_clean(), "{:?}", report.issues);
        let alpha = table.get("alpha burgers").unwrap();
        assert_eq!(alpha.annual_trips, 1_204_000.0);
        assert_eq!(alpha.active_locations, 40.0);
        assert!((alpha.franchise_share - 0.60).abs() < 1e-12);
        assert!((alpha.basket_size - 24.50).abs() < 1e-12);
        assert!((alpha.marketplace_fee - 0.22).abs() < 1e-12);
        assert!((alpha.defect_rate - 0.035).abs() < 1e-12);
        assert!((alpha.courier_wait_minutes - 4.2).abs() < 1e-12);
        assert_eq!(alpha.segment(20.0), Segment::Enterprise);
    }

    #[test]
    fn test_bad_cells_filled_with_median() {
        let sheet = Sheet::new(
            "Brands",
            headers(),
            vec![
                row("A", ["100", "1", "2", "0", "$10", "20%", "10%", "2%", "3"]),
                row("B", ["300", "1", "2", "0", "$20", "20%", "10%", "4%", "5"]),
                row("C", ["abc", "1", "2", "0", "", "20%", "10%", "-1", "4"]),
            ],
        );

        let (table, report) = BrandTable::from_sheet(&sheet);
        assert_eq!(table.len(), 3);
        assert_eq!(report.count(IssueKind::NonNumeric), 1);
        assert_eq!(report.count(IssueKind::MissingValue), 1);
        assert_eq!(report.count(IssueKind::NegativeValue), 1);

        let c = table.get("C").unwrap();
        assert_eq!(c.annual_trips, 200.0);
        assert_eq!(c.basket_size, 15.0);
        assert!((c.defect_rate - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_missing_names_and_duplicates_excluded() {
        let values = ["1", "1", "1", "0", "1", "0.2", "0", "0", "1"];
        let sheet = Sheet::new(
            "Brands",
            headers(),
            vec![
                row("Alpha", values),
                row("", values),
                row("ALPHA", values),
                row("Beta", values),
            ],
        );

        let (table, report) = BrandTable::from_sheet(&sheet);
        assert_eq!(table.len(), 2);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_excluded, 2);
        assert_eq!(report.count(IssueKind::MissingName), 1);
        assert_eq!(report.count(IssueKind::DuplicateBrand), 1);
    }

    #[test]
    fn test_active_locations_clamped() {
        let sheet = Sheet::new(
            "Brands",
            headers(),
            vec![row("Alpha", ["10", "12", "8", "0", "1", "0.2", "0", "0", "1"])],
        );

        let (table, report) = BrandTable::from_sheet(&sheet);
        assert_eq!(report.count(IssueKind::LocationMismatch), 1);
        assert_eq!(table.records()[0].active_locations, 8.0);
    }

    #[test]
    fn test_missing_column_reported() {
        let mut headers = headers();
        headers.retain(|h| h != "Order Defect Rate");
        let sheet = Sheet::new(
            "Brands",
            headers,
            vec![vec![
                text("Alpha"),
                text("10"),
                text("1"),
                text("1"),
                text("0"),
                text("1"),
                text("0.2"),
                text("0"),
                text("1"),
            ]],
        );

        let (table, report) = BrandTable::from_sheet(&sheet);
        assert_eq!(report.count(IssueKind::MissingColumn), 1);
        assert!(!table.is_available(BrandField::DefectRate));
        assert!(table.is_available(BrandField::CourierWait));
        assert_eq!(table.records()[0].defect_rate, 0.0);
        assert_eq!(table.records()[0].courier_wait_minutes, 1.0);
    }

    #[test]
    fn test_to_frame_shape() {
        let table: BrandTable = vec![
            BrandRecord::named("A").with(BrandField::AnnualTrips, 10.0),
            BrandRecord::named("B").with(BrandField::AnnualTrips, 20.0),
        ]
        .into_iter()
        .collect();

        let frame = table.to_frame().unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 10);
        let trips = frame.column("annual_trips").unwrap().f64().unwrap();
        assert_eq!(trips.get(1), Some(20.0));
    }

    #[test]
    fn test_derived_metrics() {
        let record = BrandRecord::named("A")
            .with(BrandField::BasketSize, 20.0)
            .with(BrandField::MarketplaceFee, 0.25)
            .with(BrandField::ActiveLocations, 3.0)
            .with(BrandField::TotalLocations, 4.0)
            .with(BrandField::FranchiseShare, 0.6);

        assert_eq!(record.revenue_per_order(), 5.0);
        assert_eq!(record.location_activation_rate(), 0.75);
        assert!(record.is_franchised());
        assert_eq!(record.segment(20.0), Segment::Smb);
        assert_eq!(BrandRecord::named("Z").location_activation_rate(), 0.0);
    }
}
