//! Report generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required builder field was not set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// One titled block of a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSection {
    /// Section heading
    pub heading: String,
    /// Preformatted body
    pub body: String,
}

/// A titled, timestamped report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title.
    pub title: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Workbook the figures came from.
    pub source: Option<String>,

    /// Sections, in order.
    pub sections: Vec<ReportSection>,

    /// Machine-readable payload.
    pub data: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(title: String, sections: Vec<ReportSection>, data: serde_json::Value) -> Self {
        Self {
            title,
            timestamp: Utc::now(),
            source: None,
            sections,
            data,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain text for the terminal.
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.title));
        output.push_str(&format!("Generated: {}\n", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        if let Some(source) = &self.source {
            output.push_str(&format!("Source: {source}\n"));
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');
        for section in &self.sections {
            output.push_str(&format!("\n{}\n", section.heading));
            output.push_str(&"-".repeat(section.heading.chars().count()));
            output.push('\n');
            output.push_str(&section.body);
            if !section.body.ends_with('\n') {
                output.push('\n');
            }
        }
        output
    }

    /// Markdown document.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("# {}\n\n", self.title));
        output.push_str(&format!(
            "**Generated:** {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if let Some(source) = &self.source {
            output.push_str(&format!("**Source:** `{source}`\n\n"));
        }
        for section in &self.sections {
            output.push_str(&format!("## {}\n\n", section.heading));
            output.push_str(&section.body);
            output.push_str("\n\n");
        }
        output
    }

    /// Write the Markdown rendering to a file.
    pub fn write_markdown(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_markdown())?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    source: Option<String>,
    sections: Vec<ReportSection>,
    data: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source workbook.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Append a section.
    pub fn section(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push(ReportSection {
            heading: heading.into(),
            body: body.into(),
        });
        self
    }

    /// Set the machine-readable payload.
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(ReportError::MissingField("title"))?;
        let mut report = Report::new(
            title,
            self.sections,
            self.data.unwrap_or(serde_json::Value::Null),
        );
        report.source = self.source;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("Scores".to_string(), vec![], serde_json::json!({"test": "data"}));

        assert_eq!(report.title, "Scores");
        assert!(report.sections.is_empty());
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .title("Merchant Scoring")
            .source("brands.xlsx")
            .section("Top brands", "1. Alpha\n2. Bravo")
            .data(serde_json::json!({"key": "value"}))
            .build()
            .unwrap();

        assert_eq!(report.title, "Merchant Scoring");
        assert_eq!(report.sections.len(), 1);

        let text = report.to_text();
        assert!(text.contains("Source: brands.xlsx"));
        assert!(text.contains("Top brands\n----------\n1. Alpha"));

        let markdown = report.to_markdown();
        assert!(markdown.starts_with("# Merchant Scoring"));
        assert!(markdown.contains("## Top brands"));

        let json = report.to_json().unwrap();
        assert!(json.contains("\"key\""));
    }

    #[test]
    fn test_missing_title() {
        assert!(matches!(
            ReportBuilder::new().section("a", "b").build(),
            Err(ReportError::MissingField("title"))
        ));
    }
}
