//! # Provider Discovery
//!
//! Host-side bootstrap that populates a [`PluginManager`] from a directory
//! of factor files. This replaces the reflective entry-point scanning of
//! dynamic-language plugin hosts with an explicit, mechanism-appropriate
//! scan: the registry itself stays free of any loading logic.
//!
//! ## Directory Layout
//!
//! ```text
//! <root>/
//! ├── factors/        one provider per .csv/.json factor file
//! │   ├── egrid.csv
//! │   └── fleet.json
//! └── calculators/    reserved; calculator plugins are compiled code and
//!                     register through the explicit API instead
//! ```
//!
//! Each readable factor file becomes a [`StaticFactorProvider`] named after
//! the file stem. A file that fails to load (or a row that fails
//! validation) is recorded in the [`DiscoveryReport`] and skipped - one bad
//! entry never aborts discovery of the others.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::factors::loader::FactorLoader;
use crate::plugins::{PluginManager, StaticFactorProvider};

/// Registration group for factor providers (directory name convention)
pub const FACTOR_PROVIDER_GROUP: &str = "factors";

/// Registration group for calculator plugins (directory name convention)
pub const CALCULATOR_PLUGIN_GROUP: &str = "calculators";

/// Version string assigned to file-discovered providers
const DISCOVERED_VERSION: &str = "1.0.0";

/// One entry that failed during a discovery pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryFailure {
    /// The entry that failed (file path, optionally with a row location)
    pub entry: String,
    /// Why it was skipped
    pub reason: String,
}

/// Outcome of a discovery pass.
///
/// Discovery favors completeness over strictness: failures degrade the
/// provider set but are never raised as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Provider names registered by this pass, in registration order
    pub registered: Vec<String>,
    /// Entries that were skipped, with reasons
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    /// True when every entry loaded cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Scan `<root>/factors/` and register one provider per factor file.
///
/// Files are visited in name order so repeated scans register providers
/// deterministically. A missing `factors/` directory is not an error -
/// discovery simply finds nothing.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use ghg_core::plugins::PluginManager;
/// use ghg_core::plugins::discovery::discover_factor_providers;
///
/// let mut manager = PluginManager::new();
/// let report = discover_factor_providers(Path::new("/etc/ghg"), &mut manager);
/// for failure in &report.failures {
///     eprintln!("skipped {}: {}", failure.entry, failure.reason);
/// }
/// ```
pub fn discover_factor_providers(root: &Path, manager: &mut PluginManager) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();
    let factors_dir = root.join(FACTOR_PROVIDER_GROUP);

    if !factors_dir.is_dir() {
        return report;
    }

    let entries = match std::fs::read_dir(&factors_dir) {
        Ok(entries) => entries,
        Err(e) => {
            report.failures.push(DiscoveryFailure {
                entry: factors_dir.display().to_string(),
                reason: e.to_string(),
            });
            return report;
        }
    };

    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let load_result = match extension {
            "csv" => FactorLoader::read_csv(&path),
            "json" => FactorLoader::read_json(&path),
            // Not a factor file; leave it alone
            _ => continue,
        };

        match load_result {
            Ok(loaded) => {
                for skipped in &loaded.skipped {
                    report.failures.push(DiscoveryFailure {
                        entry: format!("{} ({})", path.display(), skipped.location),
                        reason: skipped.reason.clone(),
                    });
                }

                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unnamed")
                    .to_string();
                manager.register_factor_provider(Box::new(StaticFactorProvider::new(
                    name.clone(),
                    DISCOVERED_VERSION,
                    loaded.factors,
                )));
                report.registered.push(name);
            }
            Err(e) => {
                report.failures.push(DiscoveryFailure {
                    entry: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_discovery_root(name: &str) -> PathBuf {
        let root = temp_dir().join(format!("ghg_discovery_{}_{}", name, Uuid::new_v4()));
        fs::create_dir_all(root.join(FACTOR_PROVIDER_GROUP)).unwrap();
        root
    }

    #[test]
    fn test_missing_directory_yields_empty_report() {
        let mut manager = PluginManager::new();
        let report = discover_factor_providers(Path::new("/nonexistent/ghg"), &mut manager);
        assert!(report.is_clean());
        assert!(report.registered.is_empty());
        assert!(manager.list_factor_providers().is_empty());
    }

    #[test]
    fn test_discovers_providers_from_factor_files() {
        let root = temp_discovery_root("ok");
        let factors_dir = root.join(FACTOR_PROVIDER_GROUP);

        fs::write(
            factors_dir.join("grid.csv"),
            "gas,value,unit,source,category\nCO2,0.417,kg CO2 per kWh,EPA eGRID,Electricity\n",
        )
        .unwrap();
        fs::write(
            factors_dir.join("fleet.json"),
            r#"[{"gas": "CO2", "value": 8.887, "unit": "kg CO2 per gallon", "source": "EPA", "category": "Gasoline"}]"#,
        )
        .unwrap();

        let mut manager = PluginManager::new();
        let report = discover_factor_providers(&root, &mut manager);

        assert!(report.is_clean());
        // Name order: fleet before grid
        assert_eq!(report.registered, vec!["fleet", "grid"]);
        assert_eq!(manager.get_all_factors(None).len(), 2);
        assert_eq!(manager.get_factors_by_provider("grid").len(), 1);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_bad_file_is_skipped_not_fatal() {
        let root = temp_discovery_root("partial");
        let factors_dir = root.join(FACTOR_PROVIDER_GROUP);

        fs::write(factors_dir.join("broken.json"), "not json at all").unwrap();
        fs::write(
            factors_dir.join("good.csv"),
            "gas,value,unit,source,category\nCH4,0.001,kg CH4 per kWh,Test,Electricity\n",
        )
        .unwrap();

        let mut manager = PluginManager::new();
        let report = discover_factor_providers(&root, &mut manager);

        // The broken file is reported, the good one still registers
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].entry.contains("broken.json"));
        assert_eq!(report.registered, vec!["good"]);
        assert_eq!(manager.get_all_factors(None).len(), 1);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_row_level_skips_are_reported() {
        let root = temp_discovery_root("rows");
        let factors_dir = root.join(FACTOR_PROVIDER_GROUP);

        fs::write(
            factors_dir.join("mixed.csv"),
            "gas,value,unit,source,category\n\
             CO2,0.417,kg CO2 per kWh,EPA,Electricity\n\
             SF6,1.0,kg,Test,Electricity\n",
        )
        .unwrap();

        let mut manager = PluginManager::new();
        let report = discover_factor_providers(&root, &mut manager);

        // Provider registers with the valid row; the unknown gas is reported
        assert_eq!(report.registered, vec!["mixed"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(manager.get_factors_by_provider("mixed").len(), 1);

        let _ = fs::remove_dir_all(&root);
    }
}
