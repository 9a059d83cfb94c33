use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use mortality_analysis::AnalysisConfig;
use mortality_analysis::commands::forecast::history_years;
use mortality_analysis::commands::{ImportTarget, Pipeline};
use mortality_analysis::utils::dates::SpanFilter;

#[derive(Parser)]
#[command(
    name = "mortality",
    version,
    about = "Age-standardized mortality, temperature correlation and cohort forecasts for France"
)]
struct Cli {
    /// JSON configuration file; built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every missing source file
    Download,
    /// Parse downloaded sources into the store
    Import {
        /// Import a single table
        #[arg(long, value_enum)]
        only: Option<ImportTarget>,
    },
    /// Download, import, then compute every chart
    All,
    /// Mortality rate by age for each date preset
    MortalityByAge {
        /// Preset keys; all presets when omitted
        #[arg(long, value_delimiter = ',')]
        presets: Vec<String>,
    },
    /// Deaths per day for each date preset
    DeathsByDate {
        #[arg(long, value_delimiter = ',')]
        presets: Vec<String>,
    },
    /// Population by age for each preset year
    PopulationByAge {
        #[arg(long, value_delimiter = ',')]
        presets: Vec<String>,
    },
    /// Deaths by age for each date preset
    DeathsByAge {
        #[arg(long, value_delimiter = ',')]
        presets: Vec<String>,
    },
    /// Cumulative difference in deaths by age between two years
    CumulativeDifference {
        #[arg(long)]
        from: i32,
        #[arg(long)]
        to: i32,
    },
    /// Daily age-standardized mortality relative to summer
    StandardizedMortality {
        /// Age range, e.g. `60-100`
        #[arg(long)]
        ages: Option<SpanFilter>,
    },
    /// Yearly deaths at constant population
    StandardizedYearly,
    /// Excess-death factor by age and temperature
    TemperatureFactors,
    /// Fit mortality against temperature
    EstimateTemperature {
        /// Days between a temperature and the mortality it is compared with
        #[arg(long, default_value_t = 0)]
        lag: u32,
        #[arg(long)]
        ages: Option<SpanFilter>,
    },
    /// Project deaths of the current population
    Forecast {
        #[arg(long)]
        start: Option<i32>,
        #[arg(long)]
        end: Option<i32>,
        /// Years whose mortality rates are averaged, e.g. `2010-2019`
        #[arg(long)]
        history: Option<SpanFilter>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    log::debug!("{config}");

    let start = Instant::now();
    let mut pipeline = Pipeline::from_config(config)?;

    match cli.command {
        Commands::Download => pipeline.download().await?,
        Commands::Import { only } => {
            pipeline.import(only)?;
        }
        Commands::All => {
            pipeline.download().await?;
            pipeline.import(None)?;
            let charts = pipeline.all_charts()?;
            info!("Published {} charts", charts.len());
        }
        Commands::MortalityByAge { presets } => {
            pipeline.mortality_by_age(&presets)?;
        }
        Commands::DeathsByDate { presets } => {
            pipeline.deaths_by_date(&presets)?;
        }
        Commands::PopulationByAge { presets } => {
            pipeline.population_by_age(&presets)?;
        }
        Commands::DeathsByAge { presets } => {
            pipeline.deaths_by_age(&presets)?;
        }
        Commands::CumulativeDifference { from, to } => {
            pipeline.cumulative_difference(from, to)?;
        }
        Commands::StandardizedMortality { ages } => {
            pipeline.standardized_mortality(ages)?;
        }
        Commands::StandardizedYearly => {
            pipeline.standardized_yearly()?;
        }
        Commands::TemperatureFactors => {
            pipeline.temperature_factors()?;
        }
        Commands::EstimateTemperature { lag, ages } => {
            pipeline.estimate_temperature(lag, ages)?;
        }
        Commands::Forecast { start, end, history } => {
            let defaults = pipeline.config.forecast;
            let (first, last) = match history {
                Some(span) => history_years(span)?,
                None => (defaults.history_first_year, defaults.history_last_year),
            };
            pipeline.forecast(
                start.unwrap_or(defaults.start_year),
                end.unwrap_or(defaults.end_year),
                first,
                last,
            )?;
        }
    }

    info!("Done in {:?}", start.elapsed());
    Ok(())
}
