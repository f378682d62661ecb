//! Export of scores, simulations and unit economics.
//!
//! CSV output is one header line plus one line per row. Scored brands are
//! written in rank order with one points column per weighted metric.

use platter_data::Segment;
use platter_economics::{FeeRecommendation, SimulationRow, UnitEconomics};
use platter_scoring::{Metric, ScoreResult, Scoreboard};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized CSV was not UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::PrettyJson,
            _ => Self::Csv,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn rows_to_string<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for row in rows {
                wtr.serialize(row)?;
            }
            finish(wtr)
        }
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

/// One scored brand, flattened for export.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreExport {
    /// Rank, 1 is best
    pub rank: usize,
    /// Brand name
    pub brand: String,
    /// Enterprise or SMB
    pub segment: Segment,
    /// Tier
    pub tier: String,
    /// Composite score, 0–100
    pub score: f64,
    /// Score band
    pub band: String,
    /// Points per weighted metric
    pub components: BTreeMap<Metric, f64>,
    /// Annual trips
    pub annual_trips: f64,
    /// Average basket
    pub basket_size: f64,
    /// Marketplace fee
    pub marketplace_fee: f64,
    /// Defect rate
    pub defect_rate: f64,
    /// Courier wait, minutes
    pub courier_wait_minutes: f64,
}

impl ScoreExport {
    fn from_result(result: &ScoreResult, enterprise_threshold: f64) -> Self {
        let brand = &result.brand;
        Self {
            rank: result.rank,
            brand: brand.name.clone(),
            segment: brand.segment(enterprise_threshold),
            tier: result.tier.to_string(),
            score: result.composite,
            band: result.band().to_string(),
            components: result.components.clone(),
            annual_trips: brand.annual_trips,
            basket_size: brand.basket_size,
            marketplace_fee: brand.marketplace_fee,
            defect_rate: brand.defect_rate,
            courier_wait_minutes: brand.courier_wait_minutes,
        }
    }
}

/// Scored brands in rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBrands {
    /// Weighted metrics, one points column each
    pub metrics: Vec<Metric>,
    /// Rows in rank order
    pub rows: Vec<ScoreExport>,
}

impl ScoredBrands {
    /// Flatten a scoreboard.
    pub fn new(board: &Scoreboard, enterprise_threshold: f64) -> Self {
        Self {
            metrics: board.weights.active().into_iter().map(|(m, _)| m).collect(),
            rows: board
                .results
                .iter()
                .map(|r| ScoreExport::from_result(r, enterprise_threshold))
                .collect(),
        }
    }

    /// Keep only the first `n` rows.
    pub fn truncated(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = ["rank", "brand", "segment", "tier", "score", "band"]
            .into_iter()
            .map(str::to_string)
            .collect();
        header.extend(self.metrics.iter().map(|m| format!("{}_points", m.name())));
        header.extend(
            [
                "annual_trips",
                "basket_size",
                "marketplace_fee",
                "defect_rate",
                "courier_wait_minutes",
            ]
            .into_iter()
            .map(str::to_string),
        );
        header
    }
}

impl Exporter for ScoredBrands {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(self.header())?;
                for row in &self.rows {
                    let mut record = vec![
                        row.rank.to_string(),
                        row.brand.clone(),
                        row.segment.to_string(),
                        row.tier.clone(),
                        format!("{:.2}", row.score),
                        row.band.clone(),
                    ];
                    record.extend(self.metrics.iter().map(|m| {
                        row.components
                            .get(m)
                            .map(|v| format!("{v:.2}"))
                            .unwrap_or_default()
                    }));
                    record.extend([
                        row.annual_trips.to_string(),
                        row.basket_size.to_string(),
                        row.marketplace_fee.to_string(),
                        row.defect_rate.to_string(),
                        row.courier_wait_minutes.to_string(),
                    ]);
                    wtr.write_record(&record)?;
                }
                finish(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&self.rows)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.rows)?),
        }
    }
}

impl Exporter for [SimulationRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}

impl Exporter for [FeeRecommendation] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}

/// Unit economics flattened for CSV.
#[derive(Debug, Serialize)]
struct UnitEconomicsFlat<'a> {
    brand: &'a str,
    revenue_per_trip: f64,
    courier_cost: f64,
    processing_cost: f64,
    defect_cost: f64,
    acquisition_cost: f64,
    total_cost_per_trip: f64,
    margin_per_trip: f64,
    margin_pct: f64,
    annual_margin: f64,
    profitable: bool,
}

impl<'a> From<&'a UnitEconomics> for UnitEconomicsFlat<'a> {
    fn from(unit: &'a UnitEconomics) -> Self {
        Self {
            brand: &unit.name,
            revenue_per_trip: unit.revenue_per_trip,
            courier_cost: unit.costs.courier,
            processing_cost: unit.costs.processing,
            defect_cost: unit.costs.defect,
            acquisition_cost: unit.costs.acquisition,
            total_cost_per_trip: unit.total_cost_per_trip,
            margin_per_trip: unit.margin_per_trip,
            margin_pct: unit.margin_pct,
            annual_margin: unit.annual_margin,
            profitable: unit.profitable,
        }
    }
}

impl Exporter for [UnitEconomics] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let flat: Vec<UnitEconomicsFlat<'_>> = self.iter().map(Into::into).collect();
                rows_to_string(&flat, format)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
