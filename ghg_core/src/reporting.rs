//! # Report Generation
//!
//! Renders batches of calculation records ([`ReportData`]) into the
//! supported output formats. Records are consumed verbatim: generation
//! never recomputes or mutates anything, it only formats what the
//! calculator produced.
//!
//! ## Formats
//!
//! - **CSV** - one row per gas-level result, for spreadsheet import
//! - **JSON** - the full `ReportData` structure, pretty-printed
//! - **Text** - human-readable summary with scope and gas breakdowns

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{GhgError, GhgResult};
use crate::models::ReportData;

/// Supported report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Json,
    Text,
}

impl ReportFormat {
    /// All formats for UI/CLI selection
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Csv, ReportFormat::Json, ReportFormat::Text];

    /// Wire/display string
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
        }
    }

    /// Parse a format from its wire string
    pub fn parse(s: &str) -> Option<ReportFormat> {
        ReportFormat::ALL.iter().copied().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generator for emissions reports in multiple formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        ReportGenerator
    }

    /// Render a report in the given format.
    pub fn generate(&self, report: &ReportData, format: ReportFormat) -> GhgResult<String> {
        match format {
            ReportFormat::Csv => Ok(self.generate_csv(report)),
            ReportFormat::Json => self.generate_json(report),
            ReportFormat::Text => Ok(self.generate_summary_text(report)),
        }
    }

    /// Generate a CSV report: one row per gas-level result.
    pub fn generate_csv(&self, report: &ReportData) -> String {
        let mut out = String::new();
        out.push_str(
            "Calculation ID,Activity Type,Quantity,Unit,Gas,Emission Amount,\
             CO2 Equivalent (kg),Scope,Factor Source,Calculated At\n",
        );

        for record in &report.records {
            for result in &record.results {
                let row = [
                    csv_escape(&record.calculation_id),
                    csv_escape(&record.activity.activity_type),
                    record.activity.quantity.to_string(),
                    record.activity.unit.to_string(),
                    result.gas.to_string(),
                    result.amount.to_string(),
                    result.co2_equivalent.to_string(),
                    record.scope.to_string(),
                    csv_escape(&result.factor_used.source),
                    result.calculated_at.to_rfc3339(),
                ];
                out.push_str(&row.join(","));
                out.push('\n');
            }
        }

        out
    }

    /// Generate a JSON report: the full report data, pretty-printed.
    pub fn generate_json(&self, report: &ReportData) -> GhgResult<String> {
        serde_json::to_string_pretty(report).map_err(|e| GhgError::SerializationError {
            reason: e.to_string(),
        })
    }

    /// Generate a human-readable text summary with scope and gas breakdowns.
    pub fn generate_summary_text(&self, report: &ReportData) -> String {
        let total_co2e = report.total_co2e();

        // BTreeMap keeps breakdown ordering deterministic
        let mut by_scope: BTreeMap<&str, f64> = BTreeMap::new();
        let mut by_gas: BTreeMap<&str, f64> = BTreeMap::new();
        for record in &report.records {
            *by_scope.entry(record.scope.as_str()).or_insert(0.0) += record.total_co2e;
            for result in &record.results {
                *by_gas.entry(result.gas.as_str()).or_insert(0.0) += result.co2_equivalent;
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "GHG Emissions Report");
        let _ = writeln!(out, "====================");
        let _ = writeln!(out);
        let _ = writeln!(out, "Organization: {}", report.organization);
        let _ = writeln!(out, "Report Title: {}", report.report_title);
        let _ = writeln!(
            out,
            "Period: {} to {}",
            report.period_start.format("%Y-%m-%d"),
            report.period_end.format("%Y-%m-%d")
        );
        let _ = writeln!(out, "Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Calculations: {}", report.records.len());
        let _ = writeln!(
            out,
            "Total Emissions: {:.2} kg CO2e ({:.3} tonnes)",
            total_co2e,
            total_co2e / 1000.0
        );

        if !by_scope.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "By Scope:");
            for (scope, co2e) in &by_scope {
                let _ = writeln!(out, "  {}: {:.2} kg CO2e", scope, co2e);
            }
        }

        if !by_gas.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "By Gas:");
            for (gas, co2e) in &by_gas {
                let _ = writeln!(out, "  {}: {:.2} kg CO2e", gas, co2e);
            }
        }

        out
    }

    /// Render a report and write it to a file.
    pub fn save_report(&self, report: &ReportData, path: &Path, format: ReportFormat) -> GhgResult<()> {
        let content = self.generate(report, format)?;
        std::fs::write(path, content).map_err(|e| {
            GhgError::file_error("write", path.display().to_string(), e.to_string())
        })
    }
}

/// Quote a CSV field if it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::EmissionCalculator;
    use crate::models::{ActivityData, EmissionFactor, GasType, Scope, Unit};
    use chrono::{TimeZone, Utc};

    fn sample_report() -> ReportData {
        let calculator = EmissionCalculator::new();
        let activity = ActivityData::new("Electricity Usage", 1000.0, Unit::KWh).unwrap();
        let factors = [
            EmissionFactor::new(GasType::Co2, 0.4, "kg CO2 per kWh", "Test", "Electricity").unwrap(),
            EmissionFactor::new(GasType::Ch4, 0.001, "kg CH4 per kWh", "Test", "Electricity").unwrap(),
        ];
        let record = calculator
            .calculate_emissions(&activity, &factors, Scope::Scope2, Some("calc-1".to_string()))
            .unwrap();

        ReportData::new(
            vec![record],
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap(),
            "Test Org",
            "Annual Emissions",
        )
    }

    #[test]
    fn test_csv_has_one_row_per_result() {
        let report = sample_report();
        let csv = ReportGenerator::new().generate_csv(&report);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3); // header + two results
        assert!(lines[0].starts_with("Calculation ID,Activity Type"));
        assert!(lines[1].contains("calc-1"));
        assert!(lines[1].contains("CO2"));
        assert!(lines[2].contains("CH4"));
        assert!(lines[2].contains("25")); // 1000 * 0.001 * 25
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("has,comma"), "\"has,comma\"");
        assert_eq!(csv_escape("has\"quote"), "\"has\"\"quote\"");
    }

    #[test]
    fn test_json_roundtrips() {
        let report = sample_report();
        let json = ReportGenerator::new().generate_json(&report).unwrap();
        let roundtrip: ReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, report);
    }

    #[test]
    fn test_text_summary_contents() {
        let report = sample_report();
        let text = ReportGenerator::new().generate_summary_text(&report);

        assert!(text.contains("Test Org"));
        assert!(text.contains("Annual Emissions"));
        assert!(text.contains("Total Calculations: 1"));
        assert!(text.contains("425.00 kg CO2e")); // 400 + 25
        assert!(text.contains("Scope 2: 425.00 kg CO2e"));
        assert!(text.contains("CH4: 25.00 kg CO2e"));
    }

    #[test]
    fn test_save_report_writes_file() {
        let report = sample_report();
        let path = std::env::temp_dir().join(format!("ghg_report_{}.json", uuid::Uuid::new_v4()));

        ReportGenerator::new()
            .save_report(&report, &path, ReportFormat::Json)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("calc-1"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ReportFormat::parse("csv"), Some(ReportFormat::Csv));
        assert_eq!(ReportFormat::parse("pdf"), None);
    }
}
