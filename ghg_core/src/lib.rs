//! # ghg_core - Greenhouse Gas Emissions Calculation Engine
//!
//! `ghg_core` computes GHG emissions for reported activities by applying
//! emission factors, converting every gas to a common CO2-equivalent unit
//! via Global Warming Potentials, and preserving an auditable calculation
//! record. Factor sources are pluggable: third-party code supplies factors
//! (and custom calculation logic) through trait-based providers registered
//! in an explicit, host-owned registry.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: calculations are pure functions of their inputs
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **No Globals**: hosts construct and own the plugin registry
//!
//! ## Quick Start
//!
//! ```rust
//! use ghg_core::calculator::EmissionCalculator;
//! use ghg_core::models::{ActivityData, EmissionFactor, GasType, Scope, Unit};
//!
//! let calculator = EmissionCalculator::new();
//! let activity = ActivityData::new("Electricity Usage", 1000.0, Unit::KWh).unwrap();
//! let factor = EmissionFactor::new(
//!     GasType::Co2, 0.417, "kg CO2 per kWh", "EPA eGRID", "Electricity",
//! ).unwrap();
//!
//! let record = calculator
//!     .calculate_emissions(&activity, &[factor], Scope::Scope2, None)
//!     .unwrap();
//!
//! println!("Total: {:.1} kg CO2e", record.total_co2e);
//! ```
//!
//! ## Modules
//!
//! - [`models`] - value types (factors, activities, results, audit records)
//! - [`calculator`] - the emission calculation engine and GWP table
//! - [`plugins`] - factor provider / calculator plugin traits and registry
//! - [`factors`] - factor file loading and the built-in standard database
//! - [`reporting`] - CSV/JSON/text report generation
//! - [`errors`] - structured error types

pub mod calculator;
pub mod errors;
pub mod factors;
pub mod models;
pub mod plugins;
pub mod reporting;

// Re-export commonly used types at crate root for convenience
pub use calculator::EmissionCalculator;
pub use errors::{GhgError, GhgResult};
pub use models::{
    ActivityData, CalculationRecord, EmissionFactor, EmissionResult, GasType, ReportData, Scope,
    Unit,
};
pub use plugins::{CalculatorPlugin, FactorProvider, PluginManager};
