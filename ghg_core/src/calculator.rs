//! # Emission Calculator
//!
//! Deterministic, side-effect-free transformation from (activity, factor
//! set, scope) to a [`CalculationRecord`]. For each factor:
//!
//! ```text
//! amount         = activity.quantity * factor.value        (kg)
//! co2_equivalent = amount * GWP[factor.gas]                (kg CO2e)
//! ```
//!
//! GWP (Global Warming Potential) defaults come from IPCC AR5, 100-year
//! horizon, and can be overridden per calculator instance.
//!
//! ## Example
//!
//! ```rust
//! use ghg_core::calculator::EmissionCalculator;
//! use ghg_core::models::{ActivityData, EmissionFactor, GasType, Scope, Unit};
//!
//! let calculator = EmissionCalculator::new();
//! let activity = ActivityData::new("Electricity Usage", 1000.0, Unit::KWh).unwrap();
//! let factor = EmissionFactor::new(
//!     GasType::Co2, 0.5, "kg CO2 per kWh", "Test Source", "Electricity",
//! ).unwrap();
//!
//! let record = calculator
//!     .calculate_emissions(&activity, &[factor], Scope::Scope2, None)
//!     .unwrap();
//!
//! assert_eq!(record.total_co2e, 500.0);
//! ```

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{GhgError, GhgResult};
use crate::models::{ActivityData, CalculationRecord, EmissionFactor, EmissionResult, GasType, Scope, Unit};

/// Identifier stamped into records produced by this engine
pub const CALCULATED_BY: &str = "ghg-core";

/// Default GWP values: IPCC AR5, 100-year horizon
pub const GWP_AR5: [(GasType, f64); 4] = [
    (GasType::Co2, 1.0),
    (GasType::Ch4, 25.0),
    (GasType::N2o, 298.0),
    (GasType::Co2e, 1.0), // already equivalent
];

/// Build the default GWP lookup table
pub fn default_gwp_factors() -> HashMap<GasType, f64> {
    GWP_AR5.iter().copied().collect()
}

/// Core calculator for greenhouse gas emissions.
///
/// Stateless apart from the instance-local GWP table; every calculation is
/// a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct EmissionCalculator {
    gwp_factors: HashMap<GasType, f64>,
}

impl EmissionCalculator {
    /// Create a calculator with the default AR5 GWP table.
    pub fn new() -> Self {
        EmissionCalculator {
            gwp_factors: default_gwp_factors(),
        }
    }

    /// Create a calculator with a caller-supplied GWP table.
    ///
    /// No validation is performed: a table missing a gas surfaces as
    /// `GwpNotFound` only when a factor for that gas is actually applied.
    pub fn with_gwp_factors(gwp_factors: HashMap<GasType, f64>) -> Self {
        EmissionCalculator { gwp_factors }
    }

    /// Calculate emissions for an activity using the provided factors.
    ///
    /// Factors are applied in input order and the order is preserved in
    /// `results`. When `calculation_id` is omitted a random UUID is
    /// generated, so repeated identical calculations never collide.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - `factors` is empty. Factor matching is the
    ///   caller's job; an empty set here is a contract violation.
    /// * `GwpNotFound` - a factor references a gas absent from this
    ///   instance's GWP table.
    pub fn calculate_emissions(
        &self,
        activity: &ActivityData,
        factors: &[EmissionFactor],
        scope: Scope,
        calculation_id: Option<String>,
    ) -> GhgResult<CalculationRecord> {
        if factors.is_empty() {
            return Err(GhgError::invalid_input(
                "factors",
                "[]",
                "At least one emission factor must be provided",
            ));
        }

        let calculation_id = calculation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let calculated_at = Utc::now();

        let mut results = Vec::with_capacity(factors.len());
        let mut total_co2e = 0.0;

        for factor in factors {
            let emission_amount = activity.quantity * factor.value;
            let co2_equivalent = emission_amount * self.gwp_for(factor.gas)?;

            results.push(EmissionResult {
                gas: factor.gas,
                amount: emission_amount,
                // Amounts are always reported in kg; the engine does no
                // general unit conversion.
                unit: Unit::Kg,
                co2_equivalent,
                scope,
                factor_used: factor.clone(),
                activity: activity.clone(),
                calculated_at,
            });

            total_co2e += co2_equivalent;
        }

        Ok(CalculationRecord {
            calculation_id,
            activity: activity.clone(),
            factors_applied: factors.to_vec(),
            results,
            total_co2e,
            scope,
            calculated_by: CALCULATED_BY.to_string(),
            calculated_at,
            notes: None,
        })
    }

    /// Calculate emissions for multiple activities, one record per activity
    /// in input order.
    ///
    /// For each activity, factors are selected by substring containment
    /// between the activity type and each factor category (both directions,
    /// case-insensitive). When nothing matches, the full factor set is
    /// applied as a fallback. That fallback can apply unrelated factors;
    /// it is long-standing behavior kept as-is, so callers wanting strict
    /// matching should select factors themselves and call
    /// [`calculate_emissions`](Self::calculate_emissions) directly.
    pub fn calculate_multiple_activities(
        &self,
        activities: &[ActivityData],
        factors: &[EmissionFactor],
        scope: Scope,
    ) -> GhgResult<Vec<CalculationRecord>> {
        let mut records = Vec::with_capacity(activities.len());

        for activity in activities {
            let activity_lower = activity.activity_type.to_lowercase();
            let matching: Vec<EmissionFactor> = factors
                .iter()
                .filter(|f| {
                    let category_lower = f.category.to_lowercase();
                    activity_lower.contains(&category_lower)
                        || category_lower.contains(&activity_lower)
                })
                .cloned()
                .collect();

            let selected: &[EmissionFactor] = if matching.is_empty() { factors } else { &matching };
            records.push(self.calculate_emissions(activity, selected, scope, None)?);
        }

        Ok(records)
    }

    /// Look up the GWP value for a gas.
    ///
    /// GasType is a closed set fully covered by the default table, so a miss
    /// here means the calculator was built with an incomplete custom table.
    pub fn gwp_for(&self, gas: GasType) -> GhgResult<f64> {
        self.gwp_factors
            .get(&gas)
            .copied()
            .ok_or_else(|| GhgError::gwp_not_found(gas.as_str()))
    }

    /// Merge GWP overrides into this instance's table.
    ///
    /// No validation: an override for a gas no factor ever references is
    /// simply stored and has no effect.
    pub fn update_gwp_factors(&mut self, overrides: HashMap<GasType, f64>) {
        self.gwp_factors.extend(overrides);
    }

    /// Gases this calculator has GWP values for, in stable display order.
    pub fn get_supported_gases(&self) -> Vec<GasType> {
        GasType::ALL
            .iter()
            .copied()
            .filter(|g| self.gwp_factors.contains_key(g))
            .collect()
    }
}

impl Default for EmissionCalculator {
    fn default() -> Self {
        EmissionCalculator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activity() -> ActivityData {
        ActivityData::new("Electricity Usage", 1000.0, Unit::KWh).unwrap()
    }

    fn co2_factor(value: f64) -> EmissionFactor {
        EmissionFactor::new(GasType::Co2, value, "kg CO2 per kWh", "Test Source", "Electricity")
            .unwrap()
    }

    fn ch4_factor(value: f64) -> EmissionFactor {
        EmissionFactor::new(GasType::Ch4, value, "kg CH4 per kWh", "Test Source", "Electricity")
            .unwrap()
    }

    #[test]
    fn test_calculate_emissions_basic() {
        let calculator = EmissionCalculator::new();
        let record = calculator
            .calculate_emissions(&sample_activity(), &[co2_factor(0.5)], Scope::Scope2, None)
            .unwrap();

        assert_eq!(record.total_co2e, 500.0); // 1000 * 0.5 * GWP 1.0
        assert_eq!(record.results.len(), 1);
        assert_eq!(record.results[0].gas, GasType::Co2);
        assert_eq!(record.results[0].amount, 500.0);
        assert_eq!(record.results[0].unit, Unit::Kg);
        assert_eq!(record.scope, Scope::Scope2);
        assert_eq!(record.calculated_by, CALCULATED_BY);
        record.validate().unwrap();
    }

    #[test]
    fn test_calculate_emissions_multiple_gases() {
        let calculator = EmissionCalculator::new();
        let factors = [co2_factor(0.4), ch4_factor(0.001)];

        let record = calculator
            .calculate_emissions(&sample_activity(), &factors, Scope::Scope1, None)
            .unwrap();

        // CO2: 1000 * 0.4 = 400 kg CO2e
        // CH4: 1000 * 0.001 = 1 kg CH4 -> 1 * 25 = 25 kg CO2e
        assert_eq!(record.total_co2e, 425.0);
        assert_eq!(record.results.len(), 2);
        // Input order preserved
        assert_eq!(record.results[0].gas, GasType::Co2);
        assert_eq!(record.results[1].gas, GasType::Ch4);
        assert_eq!(record.results[1].co2_equivalent, 25.0);
        record.validate().unwrap();
    }

    #[test]
    fn test_empty_factor_set_is_invalid_input() {
        let calculator = EmissionCalculator::new();
        for scope in Scope::ALL {
            let err = calculator
                .calculate_emissions(&sample_activity(), &[], scope, None)
                .unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_generated_ids_do_not_collide() {
        let calculator = EmissionCalculator::new();
        let a = calculator
            .calculate_emissions(&sample_activity(), &[co2_factor(0.5)], Scope::Scope2, None)
            .unwrap();
        let b = calculator
            .calculate_emissions(&sample_activity(), &[co2_factor(0.5)], Scope::Scope2, None)
            .unwrap();
        assert_ne!(a.calculation_id, b.calculation_id);
    }

    #[test]
    fn test_explicit_id_is_idempotent() {
        let calculator = EmissionCalculator::new();
        let activity = sample_activity();
        let factors = [co2_factor(0.4), ch4_factor(0.001)];

        let a = calculator
            .calculate_emissions(&activity, &factors, Scope::Scope2, Some("calc-1".to_string()))
            .unwrap();
        let b = calculator
            .calculate_emissions(&activity, &factors, Scope::Scope2, Some("calc-1".to_string()))
            .unwrap();

        assert_eq!(a.calculation_id, b.calculation_id);
        assert_eq!(a.total_co2e, b.total_co2e);
        assert_eq!(a.results.len(), b.results.len());
        for (ra, rb) in a.results.iter().zip(b.results.iter()) {
            assert_eq!(ra.amount, rb.amount);
            assert_eq!(ra.co2_equivalent, rb.co2_equivalent);
        }
    }

    #[test]
    fn test_total_matches_sum_of_results() {
        let calculator = EmissionCalculator::new();
        let factors = [co2_factor(0.123), ch4_factor(0.00077), co2_factor(1.9)];
        let record = calculator
            .calculate_emissions(&sample_activity(), &factors, Scope::Scope3, None)
            .unwrap();

        let sum: f64 = record.results.iter().map(|r| r.co2_equivalent).sum();
        assert!((record.total_co2e - sum).abs() <= crate::models::TOTAL_CO2E_TOLERANCE);
        assert!(record.total_co2e >= 0.0);
    }

    #[test]
    fn test_zero_quantity_yields_zero_total() {
        let calculator = EmissionCalculator::new();
        let activity = ActivityData::new("Electricity Usage", 0.0, Unit::KWh).unwrap();
        let record = calculator
            .calculate_emissions(&activity, &[co2_factor(0.5)], Scope::Scope2, None)
            .unwrap();
        assert_eq!(record.total_co2e, 0.0);
        record.validate().unwrap();
    }

    #[test]
    fn test_gwp_override_changes_result() {
        let mut calculator = EmissionCalculator::new();
        let activity = sample_activity();
        let factors = [ch4_factor(0.001)];

        let before = calculator
            .calculate_emissions(&activity, &factors, Scope::Scope1, None)
            .unwrap();
        assert_eq!(before.results[0].co2_equivalent, 25.0);

        calculator.update_gwp_factors(HashMap::from([(GasType::Ch4, 30.0)]));
        let after = calculator
            .calculate_emissions(&activity, &factors, Scope::Scope1, None)
            .unwrap();
        assert_eq!(after.results[0].co2_equivalent, 30.0);
    }

    #[test]
    fn test_incomplete_gwp_table_surfaces_lookup_error() {
        let calculator =
            EmissionCalculator::with_gwp_factors(HashMap::from([(GasType::Co2, 1.0)]));
        let err = calculator
            .calculate_emissions(&sample_activity(), &[ch4_factor(0.001)], Scope::Scope1, None)
            .unwrap_err();
        assert_eq!(err.error_code(), "GWP_NOT_FOUND");
    }

    #[test]
    fn test_supported_gases() {
        let calculator = EmissionCalculator::new();
        let gases = calculator.get_supported_gases();
        assert!(gases.contains(&GasType::Co2));
        assert!(gases.contains(&GasType::Ch4));
        assert!(gases.contains(&GasType::N2o));
        assert!(gases.contains(&GasType::Co2e));
    }

    #[test]
    fn test_multiple_activities_category_matching() {
        let calculator = EmissionCalculator::new();
        let factors = [
            co2_factor(0.5),
            EmissionFactor::new(GasType::Co2, 2.31, "kg CO2 per gallon", "Test", "Gasoline")
                .unwrap(),
        ];
        let activities = [
            ActivityData::new("Electricity Usage", 100.0, Unit::KWh).unwrap(),
            ActivityData::new("Gasoline Consumption", 10.0, Unit::Gallon).unwrap(),
        ];

        let records = calculator
            .calculate_multiple_activities(&activities, &factors, Scope::Scope2)
            .unwrap();

        assert_eq!(records.len(), 2);
        // Each activity matched exactly one category
        assert_eq!(records[0].factors_applied.len(), 1);
        assert_eq!(records[0].total_co2e, 50.0); // 100 * 0.5
        assert_eq!(records[1].factors_applied.len(), 1);
        assert!((records[1].total_co2e - 23.1).abs() < 1e-9); // 10 * 2.31
    }

    #[test]
    fn test_multiple_activities_fallback_uses_all_factors() {
        let calculator = EmissionCalculator::new();
        let factors = [co2_factor(0.5), ch4_factor(0.001)];
        let activities = [ActivityData::new("Cement Production", 100.0, Unit::Tonne).unwrap()];

        let records = calculator
            .calculate_multiple_activities(&activities, &factors, Scope::Scope1)
            .unwrap();

        // No category matched, so the whole factor set was applied
        assert_eq!(records[0].factors_applied.len(), 2);
    }
}
