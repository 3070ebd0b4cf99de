use std::path::PathBuf;

use airline_satisfaction::data::model::{Category, Gender, Loyalty, TravelType};
use airline_satisfaction::report::DashboardReport;
use airline_satisfaction::{load_file, Dashboard, FilterSelection};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "airline-satisfaction")]
#[command(about = "Summarise airline passenger satisfaction surveys", long_about = None)]
struct Cli {
    /// Dataset to load (.json, .csv or .parquet)
    #[arg(
        value_name = "DATASET",
        env = "AIRLINE_DATASET",
        default_value = "airline_passenger_satisfaction_dataset.json"
    )]
    dataset: PathBuf,

    /// Genders to include (repeatable; default: all)
    #[arg(long = "gender", value_name = "GENDER")]
    genders: Vec<String>,

    /// Travel types to include (repeatable; default: all)
    #[arg(long = "travel-type", value_name = "TYPE")]
    travel_types: Vec<String>,

    /// Loyalty categories to include (repeatable; default: all)
    #[arg(long, value_name = "LOYALTY")]
    loyalty: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

/// An omitted checklist means every value is selected.
fn or_all<C: Category>(labels: Vec<String>) -> Vec<String> {
    if labels.is_empty() {
        C::ALL.iter().map(|c| c.as_str().to_string()).collect()
    } else {
        labels
    }
}

fn run(cli: Cli) -> Result<()> {
    let selection = FilterSelection::from_labels(
        &or_all::<Gender>(cli.genders),
        &or_all::<TravelType>(cli.travel_types),
        &or_all::<Loyalty>(cli.loyalty),
    )
    .context("invalid filter selection")?;

    let table = load_file(&cli.dataset)
        .with_context(|| format!("loading {}", cli.dataset.display()))?;

    let mut dashboard = Dashboard::new(&table);
    dashboard.set_selection(selection);

    let report = DashboardReport::new(&dashboard);
    match cli.format {
        Format::Text => print!("{}", report.to_text()),
        Format::Json => println!("{}", report.to_json().context("serializing report")?),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
