//! # Factor File Loading
//!
//! Loads emission factors from CSV and JSON files. Loading favors
//! completeness over strictness: a malformed row is skipped and reported in
//! the [`LoadReport`], never silently dropped and never fatal to the rest
//! of the file. File-level problems (unreadable file, bad header, invalid
//! JSON) are errors.
//!
//! ## CSV Format
//!
//! Plain comma-separated values, no quoting support. Header row with at
//! least `gas,value,unit,source,category`; `description` is optional.
//!
//! ```text
//! gas,value,unit,source,category,description
//! CO2,0.417,kg CO2 per kWh,EPA eGRID,Electricity,US average grid
//! CH4,0.001,kg CH4 per kWh,EPA eGRID,Electricity,
//! ```
//!
//! ## JSON Format
//!
//! An array of objects with the same fields:
//!
//! ```json
//! [{"gas": "CO2", "value": 0.417, "unit": "kg CO2 per kWh",
//!   "source": "EPA eGRID", "category": "Electricity"}]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GhgError, GhgResult};
use crate::models::{EmissionFactor, GasType};

/// Default CSV filename probed by [`FactorLoader::load_standard_factors`]
pub const DEFAULT_CSV_FILE: &str = "factors.csv";

/// Default JSON filename probed by [`FactorLoader::load_standard_factors`]
pub const DEFAULT_JSON_FILE: &str = "factors.json";

/// A record that failed validation and was skipped during a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Where in the file the record was (e.g., "line 3", "item 2")
    pub location: String,
    /// Why it was skipped
    pub reason: String,
}

/// Outcome of loading one or more factor files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Factors that passed validation, in file order
    pub factors: Vec<EmissionFactor>,
    /// Records that were skipped, with locations and reasons
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    /// Merge another report into this one.
    pub fn extend(&mut self, other: LoadReport) {
        self.factors.extend(other.factors);
        self.skipped.extend(other.skipped);
    }
}

/// Raw factor record as it appears on the wire, before gas validation.
#[derive(Debug, Deserialize)]
struct RawFactorRecord {
    gas: String,
    value: f64,
    unit: String,
    source: String,
    category: String,
    #[serde(default)]
    description: Option<String>,
}

impl RawFactorRecord {
    /// Validate the raw record into an `EmissionFactor`.
    ///
    /// The gas check happens here, upstream of the calculator: GasType is a
    /// closed set and unknown gases must never reach the engine.
    fn into_factor(self) -> GhgResult<EmissionFactor> {
        let gas = GasType::parse(&self.gas).ok_or_else(|| {
            GhgError::invalid_input("gas", self.gas.clone(), "Unknown gas type")
        })?;
        let mut factor = EmissionFactor::new(gas, self.value, self.unit, self.source, self.category)?;
        factor.description = self.description.filter(|d| !d.is_empty());
        Ok(factor)
    }
}

/// Loader for emission factor files rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FactorLoader {
    data_dir: PathBuf,
}

impl FactorLoader {
    /// Create a loader rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        FactorLoader {
            data_dir: data_dir.into(),
        }
    }

    /// The directory this loader reads from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load factors from a CSV file (path relative to the data directory).
    pub fn load_from_csv(&self, filename: &str) -> GhgResult<LoadReport> {
        Self::read_csv(&self.data_dir.join(filename))
    }

    /// Load factors from a JSON file (path relative to the data directory).
    pub fn load_from_json(&self, filename: &str) -> GhgResult<LoadReport> {
        Self::read_json(&self.data_dir.join(filename))
    }

    /// Load the standard factor files (`factors.csv` and/or `factors.json`)
    /// from the data directory, concatenating whatever exists.
    ///
    /// Errors only when neither file is present.
    pub fn load_standard_factors(&self) -> GhgResult<LoadReport> {
        let csv_path = self.data_dir.join(DEFAULT_CSV_FILE);
        let json_path = self.data_dir.join(DEFAULT_JSON_FILE);

        if !csv_path.exists() && !json_path.exists() {
            return Err(GhgError::file_error(
                "load",
                self.data_dir.display().to_string(),
                "No factor files found",
            ));
        }

        let mut report = LoadReport::default();
        if csv_path.exists() {
            report.extend(Self::read_csv(&csv_path)?);
        }
        if json_path.exists() {
            report.extend(Self::read_json(&json_path)?);
        }
        Ok(report)
    }

    /// Standard factors for one category (case-insensitive equality).
    pub fn get_factors_by_category(&self, category: &str) -> GhgResult<Vec<EmissionFactor>> {
        Ok(self
            .load_standard_factors()?
            .factors
            .into_iter()
            .filter(|f| f.category.eq_ignore_ascii_case(category))
            .collect())
    }

    /// Standard factors for one gas.
    pub fn get_factors_by_gas(&self, gas: GasType) -> GhgResult<Vec<EmissionFactor>> {
        Ok(self
            .load_standard_factors()?
            .factors
            .into_iter()
            .filter(|f| f.gas == gas)
            .collect())
    }

    /// Search standard factors by category or description substring
    /// (case-insensitive).
    pub fn search_factors(&self, query: &str) -> GhgResult<Vec<EmissionFactor>> {
        let query_lower = query.to_lowercase();
        Ok(self
            .load_standard_factors()?
            .factors
            .into_iter()
            .filter(|f| {
                f.category.to_lowercase().contains(&query_lower)
                    || f.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&query_lower))
            })
            .collect())
    }

    /// Read a CSV factor file at an absolute or relative path.
    ///
    /// Plain CSV only: fields are split on commas with no quoting support,
    /// which factor data in practice does not need. A row with more fields
    /// than the header has columns is skipped with a diagnostic rather
    /// than misparsed.
    pub fn read_csv(path: &Path) -> GhgResult<LoadReport> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GhgError::file_error("read", path.display().to_string(), e.to_string())
        })?;

        let mut lines = content.lines().enumerate();
        let header = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((_, line)) => break line,
                None => {
                    return Err(GhgError::file_error(
                        "parse",
                        path.display().to_string(),
                        "Empty CSV file",
                    ))
                }
            }
        };

        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let column_index = |name: &str| -> GhgResult<usize> {
            columns.iter().position(|c| *c == name).ok_or_else(|| {
                GhgError::file_error(
                    "parse",
                    path.display().to_string(),
                    format!("Missing required column '{}'", name),
                )
            })
        };

        let gas_idx = column_index("gas")?;
        let value_idx = column_index("value")?;
        let unit_idx = column_index("unit")?;
        let source_idx = column_index("source")?;
        let category_idx = column_index("category")?;
        let description_idx = columns.iter().position(|c| *c == "description");

        let mut report = LoadReport::default();
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let location = format!("line {}", line_no + 1);
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();

            // More fields than header columns means an embedded comma; the
            // row would misparse into the wrong columns, so skip it loudly.
            if fields.len() > columns.len() {
                report.skipped.push(SkippedRecord {
                    location,
                    reason: format!(
                        "Row has {} fields but header has {} columns (unquoted comma?)",
                        fields.len(),
                        columns.len()
                    ),
                });
                continue;
            }

            let field = |idx: usize, name: &str| -> GhgResult<String> {
                fields
                    .get(idx)
                    .map(|s| s.to_string())
                    .ok_or_else(|| GhgError::missing_field(name))
            };

            let raw = (|| -> GhgResult<RawFactorRecord> {
                let value_str = field(value_idx, "value")?;
                Ok(RawFactorRecord {
                    gas: field(gas_idx, "gas")?,
                    value: value_str.parse().map_err(|_| {
                        GhgError::invalid_input("value", value_str.clone(), "Not a number")
                    })?,
                    unit: field(unit_idx, "unit")?,
                    source: field(source_idx, "source")?,
                    category: field(category_idx, "category")?,
                    description: description_idx
                        .and_then(|idx| fields.get(idx))
                        .map(|s| s.to_string()),
                })
            })();

            match raw.and_then(RawFactorRecord::into_factor) {
                Ok(factor) => report.factors.push(factor),
                Err(e) => report.skipped.push(SkippedRecord {
                    location,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(report)
    }

    /// Read a JSON factor file at an absolute or relative path.
    pub fn read_json(path: &Path) -> GhgResult<LoadReport> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GhgError::file_error("read", path.display().to_string(), e.to_string())
        })?;

        let items: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| GhgError::SerializationError {
                reason: format!("{}: {}", path.display(), e),
            })?;

        let mut report = LoadReport::default();
        for (idx, item) in items.into_iter().enumerate() {
            let location = format!("item {}", idx);
            let parsed = serde_json::from_value::<RawFactorRecord>(item)
                .map_err(|e| GhgError::SerializationError {
                    reason: e.to_string(),
                })
                .and_then(RawFactorRecord::into_factor);

            match parsed {
                Ok(factor) => report.factors.push(factor),
                Err(e) => report.skipped.push(SkippedRecord {
                    location,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(report)
    }
}
