//! # Emission Factor Sources
//!
//! Everything that produces `EmissionFactor` values for the engine:
//!
//! - [`loader`] - CSV/JSON factor file loading with row-level skip reporting
//! - [`standard`] - built-in database of common US emission factors
//!
//! The loader's contract with the core is simple: it produces a sequence of
//! already-validated factors. Malformed records are skipped with a
//! diagnostic here; they never reach the calculator.

pub mod loader;
pub mod standard;

pub use loader::{FactorLoader, LoadReport, SkippedRecord};
pub use standard::{standard_factors, StandardFactorProvider};
