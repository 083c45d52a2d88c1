//! # Error Types
//!
//! Structured error types for ghg_core. Each variant carries enough context
//! for a caller (human or machine) to understand and handle the failure
//! programmatically.
//!
//! ## Example
//!
//! ```rust
//! use ghg_core::errors::{GhgError, GhgResult};
//!
//! fn validate_quantity(quantity: f64) -> GhgResult<()> {
//!     if quantity < 0.0 {
//!         return Err(GhgError::InvalidInput {
//!             field: "quantity".to_string(),
//!             value: quantity.to_string(),
//!             reason: "Activity quantity must be non-negative".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for ghg_core operations
pub type GhgResult<T> = Result<T, GhgError>;

/// Structured error type for emission calculation operations.
///
/// Validation errors (`InvalidInput`, `MissingField`) are deterministic and
/// never retried; aggregation-side failures (loader rows, discovery entries)
/// are reported out-of-band instead of raised, so they never appear here.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum GhgError {
    /// An input value is invalid (negative quantity, empty factor set, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// No GWP entry for a gas. GasType is a closed set, so hitting this
    /// means a calculator was constructed with an incomplete GWP table.
    #[error("No GWP value for gas: {gas}")]
    GwpNotFound { gas: String },

    /// Calculation failed for a reason other than input validation
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error (factor files, report output)
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// A plugin misbehaved (custom calculation failure, bad provider output)
    #[error("Plugin error: '{plugin}' - {reason}")]
    PluginError { plugin: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GhgError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        GhgError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        GhgError::MissingField {
            field: field.into(),
        }
    }

    /// Create a GwpNotFound error
    pub fn gwp_not_found(gas: impl Into<String>) -> Self {
        GhgError::GwpNotFound { gas: gas.into() }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        GhgError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        GhgError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a PluginError
    pub fn plugin_error(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        GhgError::PluginError {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GhgError::InvalidInput { .. } => "INVALID_INPUT",
            GhgError::MissingField { .. } => "MISSING_FIELD",
            GhgError::GwpNotFound { .. } => "GWP_NOT_FOUND",
            GhgError::CalculationFailed { .. } => "CALCULATION_FAILED",
            GhgError::FileError { .. } => "FILE_ERROR",
            GhgError::SerializationError { .. } => "SERIALIZATION_ERROR",
            GhgError::PluginError { .. } => "PLUGIN_ERROR",
            GhgError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
