//! # Plugin System
//!
//! Extensibility surface for the calculation engine. Two independent
//! capabilities, each registered by name in a [`PluginManager`]:
//!
//! - [`FactorProvider`] - supplies additional emission factors/categories
//! - [`CalculatorPlugin`] - fully custom, non-factor-based calculation
//!   logic, invoked by name
//!
//! There is no global default manager: hosts construct a `PluginManager`
//! explicitly and pass it to whatever needs it. Runtime discovery of
//! providers from factor files lives in [`discovery`].
//!
//! ## Example
//!
//! ```rust
//! use ghg_core::models::{EmissionFactor, GasType};
//! use ghg_core::plugins::{PluginManager, StaticFactorProvider};
//!
//! let factor = EmissionFactor::new(
//!     GasType::Co2, 0.35, "kg CO2 per kWh", "Renewable Grid", "Electricity",
//! ).unwrap();
//!
//! let mut manager = PluginManager::new();
//! manager.register_factor_provider(Box::new(
//!     StaticFactorProvider::new("custom_provider", "1.0.0", vec![factor]),
//! ));
//!
//! assert_eq!(manager.list_factor_providers(), vec!["custom_provider"]);
//! assert_eq!(manager.get_all_factors(Some("electricity")).len(), 1);
//! ```

pub mod discovery;

use serde_json::Value;

use crate::errors::GhgResult;
use crate::models::{ActivityData, EmissionFactor};

/// A source of emission factors.
///
/// Implementations are expected to be immutable after construction, which
/// is what lets a quiesced registry be read without coordination.
pub trait FactorProvider: Send + Sync {
    /// Provider name. Unique per registration: registering a second
    /// provider under the same name replaces the first.
    fn name(&self) -> &str;

    /// Provider version, informational only - never compared or enforced.
    fn version(&self) -> &str;

    /// Factors this provider knows about. With a category, only factors
    /// for that category (comparison policy is provider-defined; the
    /// built-in providers use case-insensitive equality).
    fn get_factors(&self, category: Option<&str>) -> Vec<EmissionFactor>;

    /// The provider's declared category vocabulary, for discovery and UI
    /// population - never used in computation.
    fn get_categories(&self) -> Vec<String>;
}

/// Custom calculation logic invoked by name, independent of the
/// factor-based pipeline.
pub trait CalculatorPlugin: Send + Sync {
    /// Plugin name. Unique per registration, replace-on-collision.
    fn name(&self) -> &str;

    /// Plugin version, informational only.
    fn version(&self) -> &str;

    /// Perform a custom calculation over the activity. The parameter and
    /// result shapes are plugin-defined JSON.
    fn calculate_custom(
        &self,
        activity: &ActivityData,
        parameters: Option<&Value>,
    ) -> GhgResult<Value>;
}

/// In-memory factor provider over a fixed factor list.
///
/// The workhorse provider: discovery wraps each loaded factor file in one
/// of these, and tests and embedding hosts use it directly.
#[derive(Debug, Clone)]
pub struct StaticFactorProvider {
    name: String,
    version: String,
    factors: Vec<EmissionFactor>,
    categories: Vec<String>,
}

impl StaticFactorProvider {
    /// Create a provider over a fixed factor list. The category vocabulary
    /// is derived from the factors (sorted, deduplicated).
    pub fn new(name: impl Into<String>, version: impl Into<String>, factors: Vec<EmissionFactor>) -> Self {
        let mut categories: Vec<String> = factors.iter().map(|f| f.category.clone()).collect();
        categories.sort();
        categories.dedup();
        StaticFactorProvider {
            name: name.into(),
            version: version.into(),
            factors,
            categories,
        }
    }
}

impl FactorProvider for StaticFactorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn get_factors(&self, category: Option<&str>) -> Vec<EmissionFactor> {
        match category {
            Some(cat) => self
                .factors
                .iter()
                .filter(|f| f.category.eq_ignore_ascii_case(cat))
                .cloned()
                .collect(),
            None => self.factors.clone(),
        }
    }

    fn get_categories(&self) -> Vec<String> {
        self.categories.clone()
    }
}

/// Name-keyed registry of factor providers and calculator plugins.
///
/// Both registries preserve registration order (aggregation results are
/// deterministic) and replace on name collision rather than merging.
/// Concurrent use: registration takes `&mut self`, so writers serialize
/// naturally; reads need no coordination once registration has quiesced.
#[derive(Default)]
pub struct PluginManager {
    factor_providers: Vec<Box<dyn FactorProvider>>,
    calculator_plugins: Vec<Box<dyn CalculatorPlugin>>,
}

impl PluginManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        PluginManager::default()
    }

    /// Register a factor provider.
    ///
    /// A provider with the same name replaces the existing entry in place,
    /// keeping its original registration position. Factor content is not
    /// validated at registration time.
    pub fn register_factor_provider(&mut self, provider: Box<dyn FactorProvider>) {
        match self
            .factor_providers
            .iter()
            .position(|p| p.name() == provider.name())
        {
            Some(idx) => self.factor_providers[idx] = provider,
            None => self.factor_providers.push(provider),
        }
    }

    /// Register a calculator plugin. Same replace-not-merge policy as
    /// factor providers.
    pub fn register_calculator_plugin(&mut self, plugin: Box<dyn CalculatorPlugin>) {
        match self
            .calculator_plugins
            .iter()
            .position(|p| p.name() == plugin.name())
        {
            Some(idx) => self.calculator_plugins[idx] = plugin,
            None => self.calculator_plugins.push(plugin),
        }
    }

    /// Concatenate factors from all registered providers, in registration
    /// order. No deduplication: overlapping factors from different
    /// providers are all returned.
    pub fn get_all_factors(&self, category: Option<&str>) -> Vec<EmissionFactor> {
        let mut all_factors = Vec::new();
        for provider in &self.factor_providers {
            all_factors.extend(provider.get_factors(category));
        }
        all_factors
    }

    /// Factors from one provider. An unregistered name yields an empty
    /// list, not an error, to keep aggregation total.
    pub fn get_factors_by_provider(&self, provider_name: &str) -> Vec<EmissionFactor> {
        self.factor_providers
            .iter()
            .find(|p| p.name() == provider_name)
            .map(|p| p.get_factors(None))
            .unwrap_or_default()
    }

    /// Union of category vocabularies across providers, alphabetically
    /// sorted and deduplicated for determinism.
    pub fn get_available_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .factor_providers
            .iter()
            .flat_map(|p| p.get_categories())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Names of registered factor providers, in registration order.
    pub fn list_factor_providers(&self) -> Vec<String> {
        self.factor_providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Names of registered calculator plugins, in registration order.
    pub fn list_calculator_plugins(&self) -> Vec<String> {
        self.calculator_plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Look up a calculator plugin by name.
    pub fn get_calculator_plugin(&self, name: &str) -> Option<&dyn CalculatorPlugin> {
        self.calculator_plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("factor_providers", &self.list_factor_providers())
            .field("calculator_plugins", &self.list_calculator_plugins())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GhgError;
    use crate::models::GasType;
    use serde_json::json;

    fn provider(name: &str, category: &str, value: f64) -> Box<dyn FactorProvider> {
        let factor = EmissionFactor::new(GasType::Co2, value, "kg", "Test", category).unwrap();
        Box::new(StaticFactorProvider::new(name, "1.0.0", vec![factor]))
    }

    struct DoublingPlugin;

    impl CalculatorPlugin for DoublingPlugin {
        fn name(&self) -> &str {
            "doubling"
        }

        fn version(&self) -> &str {
            "0.1.0"
        }

        fn calculate_custom(
            &self,
            activity: &ActivityData,
            _parameters: Option<&Value>,
        ) -> GhgResult<Value> {
            Ok(json!({ "doubled_quantity": activity.quantity * 2.0 }))
        }
    }

    #[test]
    fn test_static_provider_category_filter() {
        let factors = vec![
            EmissionFactor::new(GasType::Co2, 0.4, "kg", "Test", "Electricity").unwrap(),
            EmissionFactor::new(GasType::Co2, 2.3, "kg", "Test", "Gasoline").unwrap(),
        ];
        let provider = StaticFactorProvider::new("test", "1.0.0", factors);

        assert_eq!(provider.get_factors(None).len(), 2);
        // Case-insensitive equality
        assert_eq!(provider.get_factors(Some("ELECTRICITY")).len(), 1);
        assert_eq!(provider.get_factors(Some("heating")).len(), 0);
        assert_eq!(provider.get_categories(), vec!["Electricity", "Gasoline"]);
    }

    #[test]
    fn test_empty_manager_aggregation_is_total() {
        let manager = PluginManager::new();
        assert!(manager.get_all_factors(None).is_empty());
        assert!(manager.get_available_categories().is_empty());
        assert!(manager.get_factors_by_provider("nobody").is_empty());
        assert!(manager.get_calculator_plugin("nobody").is_none());
    }

    #[test]
    fn test_registration_order_preserved_in_aggregation() {
        let mut manager = PluginManager::new();
        manager.register_factor_provider(provider("first", "Electricity", 0.1));
        manager.register_factor_provider(provider("second", "Electricity", 0.2));

        let factors = manager.get_all_factors(None);
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].value, 0.1);
        assert_eq!(factors[1].value, 0.2);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let mut manager = PluginManager::new();
        manager.register_factor_provider(provider("a", "Electricity", 0.1));
        manager.register_factor_provider(provider("b", "Gasoline", 0.2));
        manager.register_factor_provider(provider("a", "Diesel", 0.3));

        // Exactly one entry named "a", at its original position
        assert_eq!(manager.list_factor_providers(), vec!["a", "b"]);
        let factors = manager.get_factors_by_provider("a");
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].category, "Diesel");
    }

    #[test]
    fn test_no_deduplication_across_providers() {
        let mut manager = PluginManager::new();
        manager.register_factor_provider(provider("a", "Electricity", 0.4));
        manager.register_factor_provider(provider("b", "Electricity", 0.4));

        // Overlapping factors are all returned; callers decide what to do
        assert_eq!(manager.get_all_factors(Some("Electricity")).len(), 2);
    }

    #[test]
    fn test_categories_sorted_union() {
        let mut manager = PluginManager::new();
        manager.register_factor_provider(provider("a", "Gasoline", 0.1));
        manager.register_factor_provider(provider("b", "Electricity", 0.2));
        manager.register_factor_provider(provider("c", "Electricity", 0.3));

        assert_eq!(
            manager.get_available_categories(),
            vec!["Electricity", "Gasoline"]
        );
    }

    #[test]
    fn test_calculator_plugin_roundtrip() {
        let mut manager = PluginManager::new();
        manager.register_calculator_plugin(Box::new(DoublingPlugin));

        assert_eq!(manager.list_calculator_plugins(), vec!["doubling"]);

        let activity = ActivityData::new("Electricity", 21.0, crate::models::Unit::KWh).unwrap();
        let plugin = manager.get_calculator_plugin("doubling").unwrap();
        let result = plugin.calculate_custom(&activity, None).unwrap();
        assert_eq!(result["doubled_quantity"], json!(42.0));
    }

    #[test]
    fn test_plugin_error_propagates() {
        struct FailingPlugin;
        impl CalculatorPlugin for FailingPlugin {
            fn name(&self) -> &str {
                "failing"
            }
            fn version(&self) -> &str {
                "0.0.1"
            }
            fn calculate_custom(
                &self,
                _activity: &ActivityData,
                _parameters: Option<&Value>,
            ) -> GhgResult<Value> {
                Err(GhgError::plugin_error("failing", "unsupported activity"))
            }
        }

        let mut manager = PluginManager::new();
        manager.register_calculator_plugin(Box::new(FailingPlugin));

        let activity = ActivityData::new("Electricity", 1.0, crate::models::Unit::KWh).unwrap();
        let err = manager
            .get_calculator_plugin("failing")
            .unwrap()
            .calculate_custom(&activity, None)
            .unwrap_err();
        assert_eq!(err.error_code(), "PLUGIN_ERROR");
    }
}
