//! CPI scraper CLI - Build Corruption Perceptions Index datasets
//!
//! # Main Command
//!
//! ```bash
//! cpi-scraper run                          # Fetch, build and publish every dataset
//! cpi-scraper run --countries AFG,ARG      # Only these country datasets
//! cpi-scraper run --save                   # Keep the raw payloads in saved_data/
//! cpi-scraper run --use-saved              # Replay saved_data/ instead of the network
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! cpi-scraper group                        # Records per country
//! cpi-scraper dataset AFG                  # Build one country and print its descriptor
//! ```

use clap::{Args, Parser, Subcommand};
use cpi_scraper::{
    Configuration, JsonPublisher, LocationRegistry, Pipeline, PipelineError, PipelineResult,
    Retriever, RunOptions, RunSummary, StaticMetadata, DEFAULT_CONFIG_PATH, DEFAULT_STATIC_PATH,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cpi-scraper")]
#[command(about = "Build Corruption Perceptions Index datasets for HDX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args)]
struct Common {
    /// Project configuration
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for CSV resources and dataset descriptors
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Directory for saved raw payloads
    #[arg(long, default_value = "saved_data")]
    saved_dir: PathBuf,

    /// Save downloaded payloads
    #[arg(long)]
    save: bool,

    /// Use saved payloads instead of downloading
    #[arg(long, conflicts_with = "save")]
    use_saved: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, build and publish all datasets
    Run {
        #[command(flatten)]
        common: Common,

        /// Static metadata merged into every dataset
        #[arg(long, default_value = DEFAULT_STATIC_PATH)]
        static_metadata: PathBuf,

        /// Comma-separated ISO3 codes to build (default: all)
        #[arg(short, long)]
        countries: Option<String>,
    },

    /// Fetch and print the number of records per country
    Group {
        #[command(flatten)]
        common: Common,
    },

    /// Build a single country dataset and print its descriptor
    Dataset {
        #[command(flatten)]
        common: Common,

        /// ISO3 country code
        iso3: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            common,
            static_metadata,
            countries,
        } => cmd_run(common, static_metadata, countries.as_deref()).await,

        Commands::Group { common } => cmd_group(common).await,

        Commands::Dataset { common, iso3 } => cmd_dataset(common, &iso3).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Configuration and retriever for a command.
fn setup(common: &Common) -> PipelineResult<(Configuration, Retriever)> {
    let configuration = Configuration::read(&common.config)?;
    let retriever = Retriever::new(reqwest::Client::new(), &common.saved_dir)
        .with_save(common.save)
        .with_use_saved(common.use_saved);
    std::fs::create_dir_all(&common.output)?;
    Ok((configuration, retriever))
}

/// Catalog locations, or locations derived from the data when none is configured.
async fn load_locations(
    configuration: &Configuration,
    retriever: &Retriever,
    fallback: impl FnOnce() -> LocationRegistry,
) -> PipelineResult<LocationRegistry> {
    match configuration.locations_url {
        Some(ref url) => {
            let registry = LocationRegistry::fetch(retriever, url).await?;
            eprintln!("📍 {} catalog locations", registry.len());
            Ok(registry)
        }
        None => {
            eprintln!("📍 No locations_url configured, using country names from the data");
            Ok(fallback())
        }
    }
}

async fn cmd_run(
    common: Common,
    static_metadata: PathBuf,
    countries: Option<&str>,
) -> PipelineResult<()> {
    let (configuration, retriever) = setup(&common)?;
    let options = RunOptions {
        countries: countries.and_then(RunOptions::parse_countries),
        static_metadata: Some(StaticMetadata::read(&static_metadata)?),
    };

    let pipeline = Pipeline::new(configuration, retriever, LocationRegistry::new(), &common.output);
    let country_data = pipeline.get_data_by_country().await?;

    let locations = load_locations(pipeline.configuration(), pipeline.retriever(), || {
        LocationRegistry::from_records(&country_data)
    })
    .await?;
    let pipeline = pipeline.with_locations(locations);

    let mut publisher = JsonPublisher::new(&common.output);
    let summary = pipeline.publish_all(&country_data, &mut publisher, &options);
    print_summary(&summary)?;

    eprintln!("\n✨ Done! Output in {}", common.output.display());
    Ok(())
}

fn print_summary(summary: &RunSummary) -> PipelineResult<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

async fn cmd_group(common: Common) -> PipelineResult<()> {
    let (configuration, retriever) = setup(&common)?;
    let pipeline = Pipeline::new(configuration, retriever, LocationRegistry::new(), &common.output);

    let country_data = pipeline.get_data_by_country().await?;
    for (iso3, records) in &country_data {
        println!("{}\t{}", iso3, records.len());
    }
    eprintln!("\n📦 {} countries", country_data.len());
    Ok(())
}

async fn cmd_dataset(common: Common, iso3: &str) -> PipelineResult<()> {
    let (configuration, retriever) = setup(&common)?;
    let iso3 = iso3.to_uppercase();

    let pipeline = Pipeline::new(configuration, retriever, LocationRegistry::new(), &common.output);
    let country_data = pipeline.get_data_by_country().await?;
    let records = country_data
        .get(&iso3)
        .ok_or_else(|| PipelineError::NoRecords(iso3.clone()))?;

    let locations = load_locations(pipeline.configuration(), pipeline.retriever(), || {
        LocationRegistry::from_records(&country_data)
    })
    .await?;
    let pipeline = pipeline.with_locations(locations);

    match pipeline.generate_dataset(&iso3, records)? {
        Some(dataset) => {
            println!("{}", serde_json::to_string_pretty(&dataset)?);
            eprintln!("💾 {}", dataset.resource.path.display());
            Ok(())
        }
        None => Err(PipelineError::Skipped(iso3)),
    }
}
