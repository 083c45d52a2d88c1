//! # Standard Factor Database
//!
//! Built-in emission factors for common US activity categories, compiled
//! into the crate so the engine works out of the box with no factor files.
//! Values are from the EPA GHG Emission Factors Hub and eGRID; they are
//! national averages and a real deployment should override them with
//! region-specific providers.
//!
//! Exposed both as a plain slice ([`standard_factors`]) and as a
//! registerable [`StandardFactorProvider`].

use once_cell::sync::Lazy;

use crate::models::{EmissionFactor, GasType};
use crate::plugins::FactorProvider;

/// Name the built-in provider registers under
pub const STANDARD_PROVIDER_NAME: &str = "standard";

/// (gas, value, unit, source, category, description)
type FactorRow = (GasType, f64, &'static str, &'static str, &'static str, &'static str);

const STANDARD_TABLE: &[FactorRow] = &[
    // Electricity - US national average grid mix
    (GasType::Co2, 0.417, "kg CO2 per kWh", "EPA eGRID 2022", "Electricity", "US national average grid mix"),
    (GasType::Ch4, 0.000030, "kg CH4 per kWh", "EPA eGRID 2022", "Electricity", "US national average grid mix"),
    (GasType::N2o, 0.000004, "kg N2O per kWh", "EPA eGRID 2022", "Electricity", "US national average grid mix"),
    // Natural gas - stationary combustion
    (GasType::Co2, 0.0503, "kg CO2 per MJ", "EPA GHG Factors Hub", "Natural Gas", "Stationary combustion"),
    (GasType::Ch4, 0.0000009, "kg CH4 per MJ", "EPA GHG Factors Hub", "Natural Gas", "Stationary combustion"),
    (GasType::N2o, 0.0000001, "kg N2O per MJ", "EPA GHG Factors Hub", "Natural Gas", "Stationary combustion"),
    // Motor gasoline
    (GasType::Co2, 8.887, "kg CO2 per gallon", "EPA GHG Factors Hub", "Gasoline", "Motor gasoline combustion"),
    (GasType::Ch4, 0.00038, "kg CH4 per gallon", "EPA GHG Factors Hub", "Gasoline", "Motor gasoline combustion"),
    (GasType::N2o, 0.00008, "kg N2O per gallon", "EPA GHG Factors Hub", "Gasoline", "Motor gasoline combustion"),
    // Diesel fuel
    (GasType::Co2, 10.180, "kg CO2 per gallon", "EPA GHG Factors Hub", "Diesel", "Diesel fuel combustion"),
    (GasType::Ch4, 0.00041, "kg CH4 per gallon", "EPA GHG Factors Hub", "Diesel", "Diesel fuel combustion"),
    (GasType::N2o, 0.00008, "kg N2O per gallon", "EPA GHG Factors Hub", "Diesel", "Diesel fuel combustion"),
    // Average passenger vehicle
    (GasType::Co2e, 0.404, "kg CO2e per mile", "EPA GHG Factors Hub", "Passenger Vehicle", "Average US passenger vehicle"),
];

static STANDARD_FACTORS: Lazy<Vec<EmissionFactor>> = Lazy::new(|| {
    STANDARD_TABLE
        .iter()
        .map(|&(gas, value, unit, source, category, description)| EmissionFactor {
            gas,
            value,
            unit: unit.to_string(),
            source: source.to_string(),
            category: category.to_string(),
            description: Some(description.to_string()),
            valid_from: None,
            valid_to: None,
        })
        .collect()
});

/// The built-in standard factor set.
pub fn standard_factors() -> &'static [EmissionFactor] {
    &STANDARD_FACTORS
}

/// Factor provider backed by the built-in standard table.
///
/// # Example
///
/// ```rust
/// use ghg_core::factors::StandardFactorProvider;
/// use ghg_core::plugins::{FactorProvider, PluginManager};
///
/// let mut manager = PluginManager::new();
/// manager.register_factor_provider(Box::new(StandardFactorProvider));
///
/// let electricity = manager.get_all_factors(Some("Electricity"));
/// assert_eq!(electricity.len(), 3); // CO2, CH4, N2O
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactorProvider;

impl FactorProvider for StandardFactorProvider {
    fn name(&self) -> &str {
        STANDARD_PROVIDER_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn get_factors(&self, category: Option<&str>) -> Vec<EmissionFactor> {
        match category {
            Some(cat) => STANDARD_FACTORS
                .iter()
                .filter(|f| f.category.eq_ignore_ascii_case(cat))
                .cloned()
                .collect(),
            None => STANDARD_FACTORS.clone(),
        }
    }

    fn get_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = STANDARD_FACTORS
            .iter()
            .map(|f| f.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }
}
