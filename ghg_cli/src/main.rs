//! # GHG Calculator CLI
//!
//! Command-line front end for `ghg_core`. Constructs the activity from
//! arguments, selects matching factors from the registered providers, runs
//! the calculation, and renders the result in text, CSV, or JSON.
//!
//! ## Examples
//!
//! ```text
//! ghg-calculator --activity "Electricity Usage" --quantity 1000 --unit kWh
//! ghg-calculator -a "Gasoline Consumption" -q 500 -u gallon -s scope-1
//! ghg-calculator -a "Natural Gas" -q 10000 -u MJ -f csv -o report.csv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveTime, Utc};
use clap::{Parser, ValueEnum};

use ghg_core::factors::StandardFactorProvider;
use ghg_core::models::{ActivityData, EmissionFactor, ReportData, Scope, Unit};
use ghg_core::plugins::discovery::discover_factor_providers;
use ghg_core::reporting::{ReportFormat, ReportGenerator};
use ghg_core::{EmissionCalculator, GhgError, GhgResult, PluginManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    /// Direct emissions from owned or controlled sources
    #[value(name = "scope-1")]
    Scope1,
    /// Indirect emissions from purchased energy
    #[value(name = "scope-2")]
    Scope2,
    /// All other indirect emissions in the value chain
    #[value(name = "scope-3")]
    Scope3,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Scope1 => Scope::Scope1,
            ScopeArg::Scope2 => Scope::Scope2,
            ScopeArg::Scope3 => Scope::Scope3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Csv,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn parse_unit(s: &str) -> Result<Unit, String> {
    Unit::parse(s).ok_or_else(|| {
        let choices: Vec<&str> = Unit::ALL.iter().map(|u| u.as_str()).collect();
        format!("unknown unit '{}', expected one of: {}", s, choices.join(", "))
    })
}

/// Calculate greenhouse gas emissions from activity data
#[derive(Debug, Parser)]
#[command(name = "ghg-calculator", version, about)]
struct Cli {
    /// Type of activity (e.g., "Electricity Usage", "Gasoline Consumption")
    #[arg(short, long)]
    activity: String,

    /// Quantity of the activity
    #[arg(short, long)]
    quantity: f64,

    /// Unit of measurement (kg, tonne, liter, gallon, kWh, MJ, km, mile)
    #[arg(short, long, value_parser = parse_unit)]
    unit: Unit,

    /// Optional description of the activity
    #[arg(short, long)]
    description: Option<String>,

    /// GHG Protocol scope
    #[arg(short, long, value_enum, default_value = "scope-2")]
    scope: ScopeArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Output file path (prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory to discover additional factor providers from
    /// (expects a `factors/` subdirectory of .csv/.json files)
    #[arg(long)]
    factors_dir: Option<PathBuf>,
}

/// Select factors for an activity type.
///
/// Two passes, mirroring how factors are curated: first direct substring
/// containment of the category in the activity type, then a looser
/// word-level match. Returns an empty list when neither pass hits - the
/// caller decides whether that is an error.
fn match_factors(activity_type: &str, factors: &[EmissionFactor]) -> Vec<EmissionFactor> {
    let activity_lower = activity_type.to_lowercase();

    let direct: Vec<EmissionFactor> = factors
        .iter()
        .filter(|f| activity_lower.contains(&f.category.to_lowercase()))
        .cloned()
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    factors
        .iter()
        .filter(|f| {
            f.category
                .to_lowercase()
                .split_whitespace()
                .any(|word| activity_lower.contains(word))
        })
        .cloned()
        .collect()
}

fn run(cli: Cli) -> GhgResult<()> {
    // Explicitly constructed registry - the CLI owns its lifecycle
    let mut manager = PluginManager::new();
    manager.register_factor_provider(Box::new(StandardFactorProvider));

    if let Some(dir) = &cli.factors_dir {
        let report = discover_factor_providers(dir, &mut manager);
        for failure in &report.failures {
            eprintln!("Warning: skipped {}: {}", failure.entry, failure.reason);
        }
    }

    let all_factors = manager.get_all_factors(None);
    let matching = match_factors(&cli.activity, &all_factors);
    if matching.is_empty() {
        return Err(GhgError::invalid_input(
            "activity",
            cli.activity.as_str(),
            format!(
                "No emission factors found; available categories: {}",
                manager.get_available_categories().join(", ")
            ),
        ));
    }

    let mut activity = ActivityData::new(cli.activity.as_str(), cli.quantity, cli.unit)?;
    if let Some(description) = &cli.description {
        activity = activity.with_description(description.as_str());
    }

    let calculator = EmissionCalculator::new();
    let record = calculator.calculate_emissions(&activity, &matching, cli.scope.into(), None)?;

    let output = match cli.format {
        FormatArg::Text => {
            let mut text = format!(
                "Activity: {}\nQuantity: {} {}\nScope: {}\nTotal CO2e: {:.2} kg\n\nFactors applied:\n",
                cli.activity, cli.quantity, cli.unit, record.scope, record.total_co2e,
            );
            for factor in &record.factors_applied {
                text.push_str(&format!(
                    "- {}: {} {} ({})\n",
                    factor.category, factor.value, factor.unit, factor.source
                ));
            }
            text
        }
        FormatArg::Csv | FormatArg::Json => {
            let now = Utc::now();
            let period_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
            let report = ReportData::new(
                vec![record],
                period_start,
                now,
                "CLI Calculation",
                format!("Emissions for {}", cli.activity),
            );
            ReportGenerator::new().generate(&report, cli.format.into())?
        }
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output).map_err(|e| {
                GhgError::file_error("write", path.display().to_string(), e.to_string())
            })?;
            println!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
