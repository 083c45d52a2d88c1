//! # Core Data Model
//!
//! Value types shared across the calculation engine:
//!
//! - [`EmissionFactor`] - one emission rate (e.g., kg CO2 per kWh)
//! - [`ActivityData`] - a reported activity (e.g., 1000 kWh of electricity)
//! - [`EmissionResult`] - one gas-level outcome of a calculation
//! - [`CalculationRecord`] - the audit artifact tying everything together
//! - [`ReportData`] - a batch of records plus reporting-period metadata
//!
//! Inputs (`EmissionFactor`, `ActivityData`) validate their invariants at
//! construction and are treated as immutable afterwards. Outputs
//! (`EmissionResult`, `CalculationRecord`) are created only by the
//! [`EmissionCalculator`](crate::calculator::EmissionCalculator) and never
//! mutated.
//!
//! ## Example
//!
//! ```rust
//! use ghg_core::models::{ActivityData, EmissionFactor, GasType, Unit};
//!
//! let factor = EmissionFactor::new(
//!     GasType::Co2,
//!     0.417,
//!     "kg CO2 per kWh",
//!     "EPA eGRID",
//!     "Electricity",
//! ).unwrap();
//!
//! let activity = ActivityData::new("Electricity Usage", 1000.0, Unit::KWh).unwrap();
//! assert_eq!(activity.quantity, 1000.0);
//! assert_eq!(factor.gas, GasType::Co2);
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{GhgError, GhgResult};

/// Absolute tolerance when checking that `total_co2e` matches the sum of
/// per-result CO2 equivalents. Summation order affects rounding only.
pub const TOTAL_CO2E_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Enumerations
// ============================================================================

/// Greenhouse gas types.
///
/// This is a closed set: plugins cannot extend it. A factor source declaring
/// an unrecognized gas must be rejected by the loader before it ever reaches
/// the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GasType {
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "CH4")]
    Ch4,
    #[serde(rename = "N2O")]
    N2o,
    /// Already expressed as CO2 equivalent
    #[serde(rename = "CO2e")]
    Co2e,
}

impl GasType {
    /// All gas variants, in a stable display order
    pub const ALL: [GasType; 4] = [GasType::Co2, GasType::Ch4, GasType::N2o, GasType::Co2e];

    /// Wire/display string for this gas
    pub fn as_str(&self) -> &'static str {
        match self {
            GasType::Co2 => "CO2",
            GasType::Ch4 => "CH4",
            GasType::N2o => "N2O",
            GasType::Co2e => "CO2e",
        }
    }

    /// Parse a gas from its wire string (case-sensitive, matching the
    /// factor file format). Returns `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<GasType> {
        match s {
            "CO2" => Some(GasType::Co2),
            "CH4" => Some(GasType::Ch4),
            "N2O" => Some(GasType::N2o),
            "CO2e" => Some(GasType::Co2e),
            _ => None,
        }
    }
}

impl fmt::Display for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Units for activity quantities.
///
/// A fixed enumerated set - the engine performs no unit conversion beyond
/// reporting all emission amounts in kg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "tonne")]
    Tonne,
    #[serde(rename = "liter")]
    Liter,
    #[serde(rename = "gallon")]
    Gallon,
    #[serde(rename = "kWh")]
    KWh,
    #[serde(rename = "MJ")]
    Mj,
    #[serde(rename = "km")]
    Km,
    #[serde(rename = "mile")]
    Mile,
}

impl Unit {
    /// All unit variants for UI/CLI selection
    pub const ALL: [Unit; 8] = [
        Unit::Kg,
        Unit::Tonne,
        Unit::Liter,
        Unit::Gallon,
        Unit::KWh,
        Unit::Mj,
        Unit::Km,
        Unit::Mile,
    ];

    /// Wire/display string for this unit
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Tonne => "tonne",
            Unit::Liter => "liter",
            Unit::Gallon => "gallon",
            Unit::KWh => "kWh",
            Unit::Mj => "MJ",
            Unit::Km => "km",
            Unit::Mile => "mile",
        }
    }

    /// Parse a unit from its wire string
    pub fn parse(s: &str) -> Option<Unit> {
        Unit::ALL.iter().copied().find(|u| u.as_str() == s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// GHG Protocol scope classification.
///
/// A tag on calculation records for reporting purposes; never used in the
/// arithmetic itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Direct emissions from owned or controlled sources
    #[serde(rename = "Scope 1")]
    Scope1,
    /// Indirect emissions from purchased energy
    #[serde(rename = "Scope 2")]
    Scope2,
    /// All other indirect emissions in the value chain
    #[serde(rename = "Scope 3")]
    Scope3,
}

impl Scope {
    /// All scope variants
    pub const ALL: [Scope; 3] = [Scope::Scope1, Scope::Scope2, Scope::Scope3];

    /// Display string per the GHG Protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Scope1 => "Scope 1",
            Scope::Scope2 => "Scope 2",
            Scope::Scope3 => "Scope 3",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// One emission factor: a rate converting an activity quantity into an
/// emission amount for a single gas.
///
/// Immutable once constructed. `value` is validated non-negative at
/// construction; a negative rate is a data error, never silently corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    /// Which gas this factor emits
    pub gas: GasType,

    /// Emission rate (e.g., 0.417 for kg CO2 per kWh). Always >= 0.
    pub value: f64,

    /// Human-readable rate unit (e.g., "kg CO2 per kWh")
    pub unit: String,

    /// Where the factor came from (e.g., "EPA eGRID")
    pub source: String,

    /// Category used for matching against activity types (e.g., "Electricity")
    pub category: String,

    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Start of the validity window, if the source declares one
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window, if the source declares one
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
}

impl EmissionFactor {
    /// Create a new emission factor.
    ///
    /// Returns `InvalidInput` if `value` is negative.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ghg_core::models::{EmissionFactor, GasType};
    ///
    /// let factor = EmissionFactor::new(
    ///     GasType::Ch4, 0.001, "kg CH4 per kWh", "Test", "Electricity",
    /// ).unwrap();
    ///
    /// assert!(EmissionFactor::new(
    ///     GasType::Co2, -1.0, "kg", "Test", "Electricity",
    /// ).is_err());
    /// ```
    pub fn new(
        gas: GasType,
        value: f64,
        unit: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> GhgResult<Self> {
        if value < 0.0 {
            return Err(GhgError::invalid_input(
                "value",
                value.to_string(),
                "Emission factor value must be non-negative",
            ));
        }
        Ok(EmissionFactor {
            gas,
            value,
            unit: unit.into(),
            source: source.into(),
            category: category.into(),
            description: None,
            valid_from: None,
            valid_to: None,
        })
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a validity window
    pub fn with_validity(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.valid_from = Some(from);
        self.valid_to = Some(to);
        self
    }

    /// Check whether this factor is valid at the given instant.
    ///
    /// An absent bound is treated as unbounded on that side.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        if let Some(from) = self.valid_from {
            if at < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if at > to {
                return false;
            }
        }
        true
    }
}

/// A reported activity to compute emissions for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    /// Activity type, matched against factor categories (e.g., "Electricity Usage")
    pub activity_type: String,

    /// Reported quantity in `unit`. Always >= 0.
    pub quantity: f64,

    /// Unit the quantity was reported in
    pub unit: Unit,

    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Caller-defined metadata carried through to the audit record
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ActivityData {
    /// Create new activity data.
    ///
    /// Returns `InvalidInput` if `quantity` is negative.
    pub fn new(activity_type: impl Into<String>, quantity: f64, unit: Unit) -> GhgResult<Self> {
        if quantity < 0.0 {
            return Err(GhgError::invalid_input(
                "quantity",
                quantity.to_string(),
                "Activity quantity must be non-negative",
            ));
        }
        Ok(ActivityData {
            activity_type: activity_type.into(),
            quantity,
            unit,
            description: None,
            metadata: HashMap::new(),
        })
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

// ============================================================================
// Output Types
// ============================================================================

/// One gas-level outcome of an emissions calculation.
///
/// Created exclusively by the calculator and owned by the
/// [`CalculationRecord`] that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionResult {
    /// Gas this result is for
    pub gas: GasType,

    /// Raw emission amount (quantity * factor value), in `unit`
    pub amount: f64,

    /// Unit of `amount` - always kg; the engine does no unit conversion
    pub unit: Unit,

    /// Amount converted to kg CO2 equivalent via the GWP table
    pub co2_equivalent: f64,

    /// Scope tag carried from the calculation
    pub scope: Scope,

    /// The factor that produced this result
    pub factor_used: EmissionFactor,

    /// The activity this result was computed for
    pub activity: ActivityData,

    /// When this result was computed
    pub calculated_at: DateTime<Utc>,
}

/// The audit artifact for one emissions calculation.
///
/// Records the activity, every factor applied (in application order), the
/// per-gas results (same order), and the CO2e total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    /// Globally unique identifier for this calculation
    pub calculation_id: String,

    /// The activity that was calculated
    pub activity: ActivityData,

    /// Factors applied, in application order
    pub factors_applied: Vec<EmissionFactor>,

    /// Per-factor results, in the same order. Never empty.
    pub results: Vec<EmissionResult>,

    /// Sum of all result CO2 equivalents, in kg
    pub total_co2e: f64,

    /// Scope tag for reporting
    pub scope: Scope,

    /// Identifier of the software that produced this record
    pub calculated_by: String,

    /// When the calculation ran
    pub calculated_at: DateTime<Utc>,

    /// Optional free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CalculationRecord {
    /// Check the record's invariants: non-empty results, non-negative total,
    /// and total matching the sum of result CO2 equivalents within
    /// [`TOTAL_CO2E_TOLERANCE`].
    pub fn validate(&self) -> GhgResult<()> {
        if self.results.is_empty() {
            return Err(GhgError::invalid_input(
                "results",
                "[]",
                "Calculation must have at least one result",
            ));
        }
        if self.total_co2e < 0.0 {
            return Err(GhgError::invalid_input(
                "total_co2e",
                self.total_co2e.to_string(),
                "Total CO2e must be non-negative",
            ));
        }
        let sum: f64 = self.results.iter().map(|r| r.co2_equivalent).sum();
        if (sum - self.total_co2e).abs() > TOTAL_CO2E_TOLERANCE {
            return Err(GhgError::invalid_input(
                "total_co2e",
                self.total_co2e.to_string(),
                format!("Total CO2e does not match sum of results ({})", sum),
            ));
        }
        Ok(())
    }
}

/// Input to report generation: a batch of records plus period metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Calculation records to report on
    pub records: Vec<CalculationRecord>,

    /// Start of the reporting period
    pub period_start: DateTime<Utc>,

    /// End of the reporting period
    pub period_end: DateTime<Utc>,

    /// Reporting organization name
    pub organization: String,

    /// Report title
    pub report_title: String,

    /// When the report data was assembled
    pub generated_at: DateTime<Utc>,

    /// Caller-defined metadata (reporting standard, GWP source, etc.)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ReportData {
    /// Assemble report data for a set of records, stamped with the current time.
    pub fn new(
        records: Vec<CalculationRecord>,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        organization: impl Into<String>,
        report_title: impl Into<String>,
    ) -> Self {
        ReportData {
            records,
            period_start,
            period_end,
            organization: organization.into(),
            report_title: report_title.into(),
            generated_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Total CO2e across all records, in kg
    pub fn total_co2e(&self) -> f64 {
        self.records.iter().map(|r| r.total_co2e).sum()
    }
}
