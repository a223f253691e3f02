//! CPI dataset pipeline.
//!
//! ```text
//! ┌───────────┐    ┌─────────────┐    ┌──────────────────────┐    ┌───────────┐
//! │  CPI API  │───▶│   Grouper   │───▶│  generate_dataset    │───▶│ Publisher │
//! │  (JSON)   │    │ (by ISO3)   │    │  generate_global_... │    │           │
//! └───────────┘    └─────────────┘    └──────────────────────┘    └───────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cpi_scraper::{Configuration, LocationRegistry, Pipeline, Retriever};
//!
//! let configuration = Configuration::read("config/project_configuration.yaml")?;
//! let retriever = Retriever::new(reqwest::Client::new(), "saved_data");
//! let locations = LocationRegistry::from_entries([("afg", "Afghanistan"), ("world", "World")]);
//! let pipeline = Pipeline::new(configuration, retriever, locations, "output");
//!
//! let country_data = pipeline.get_data_by_country().await?;
//! if let Some(dataset) = pipeline.generate_dataset("AFG", &country_data["AFG"])? {
//!     println!("{} -> {}", dataset.name, dataset.resource.path.display());
//! }
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use super::grouper::{group_by_country, records_from_json, MIN_YEAR};
use super::resource::generate_resource;
use crate::config::{Configuration, StaticMetadata};
use crate::error::{FetchResult, PipelineResult, ResourceResult};
use crate::locations::{Locations, WORLD};
use crate::logs::{drain_issues, LogChannel, LogEntry, LogLevel};
use crate::models::{CountryData, DatasetBuilder, DatasetDescriptor, Record, TimePeriod};
use crate::publish::Publisher;
use crate::retriever::Retriever;

/// Suffix of every dataset name.
pub const DATASET_SUFFIX: &str = "corruption-perceptions-index";

/// File name of the global resource.
pub const GLOBAL_FILENAME: &str = "global-cpi.csv";

/// Fetches CPI records and turns them into publishable datasets.
///
/// The HTTP client (inside the [`Retriever`]), the location capability and the
/// output folder are owned by the caller and handed in here.
pub struct Pipeline<L: Locations> {
    configuration: Configuration,
    retriever: Retriever,
    locations: L,
    folder: PathBuf,
    log: LogChannel,
}

/// Options for [`Pipeline::run`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only build these ISO3 codes (all when `None`)
    pub countries: Option<BTreeSet<String>>,

    /// Merged into every dataset before publishing
    pub static_metadata: Option<StaticMetadata>,
}

impl RunOptions {
    /// Parse a comma-separated ISO3 list (`"AFG, arg"`).
    pub fn parse_countries(list: &str) -> Option<BTreeSet<String>> {
        let countries: BTreeSet<String> = list
            .split(',')
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        if countries.is_empty() {
            None
        } else {
            Some(countries)
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Countries present in the fetched data
    pub countries: usize,

    /// Dataset names handed to the publisher
    pub published: Vec<String>,

    /// Datasets skipped (unknown country or location, no records)
    pub skipped: Vec<String>,

    /// Datasets that failed to build or publish, with the reason
    pub failed: Vec<(String, String)>,

    /// Warnings and errors logged while building and publishing
    pub issues: Vec<LogEntry>,
}

impl<L: Locations> Pipeline<L> {
    pub fn new(
        configuration: Configuration,
        retriever: Retriever,
        locations: L,
        folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            configuration,
            retriever,
            locations,
            folder: folder.into(),
            log: LogChannel::new(),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Same pipeline with a different location capability.
    pub fn with_locations<M: Locations>(self, locations: M) -> Pipeline<M> {
        Pipeline {
            configuration: self.configuration,
            retriever: self.retriever,
            locations,
            folder: self.folder,
            log: self.log,
        }
    }

    /// Entries logged by this pipeline from now on.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<LogEntry> {
        self.log.subscribe()
    }

    /// Download all records and group them by ISO3 (2012 onward).
    ///
    /// Network and decoding errors propagate; nothing is retried.
    pub async fn get_data_by_country(&self) -> FetchResult<CountryData> {
        self.log.info("📡 Fetching CPI data...");
        let payload = self.retriever.download_json(&self.configuration.base_url).await?;
        let records = records_from_json(payload)?;
        self.log.success(format!("Fetched {} records from {} onward", records.len(), MIN_YEAR));

        let country_data = group_by_country(records);
        self.log.success(format!("Grouped into {} countries", country_data.len()));
        Ok(country_data)
    }

    /// Build one country's dataset and write its CSV.
    ///
    /// Returns `Ok(None)` when the country cannot be resolved or attached, or
    /// when `records` is empty.
    pub fn generate_dataset(
        &self,
        countryiso: &str,
        records: &[Record],
    ) -> ResourceResult<Option<DatasetDescriptor>> {
        let Some(country_name) = self.locations.country_name(countryiso) else {
            self.log.error(format!("Couldn't find country name for {}, skipping", countryiso));
            return Ok(None);
        };
        let iso_lower = countryiso.to_lowercase();

        let mut builder = DatasetBuilder::new(
            format!("{}-{}", iso_lower, DATASET_SUFFIX),
            format!("{} - {}", country_name, self.configuration.title),
        );
        builder.add_tags(self.configuration.tags.iter().cloned());
        match self.locations.attach(countryiso) {
            Ok(location) => builder.add_location(location),
            Err(e) => {
                self.log.error(format!("Couldn't find country {} ({}), skipping", countryiso, e));
                return Ok(None);
            }
        }

        let Some(time_period) = TimePeriod::from_years(records.iter().map(Record::year)) else {
            self.log.warning(format!("No records for {}, skipping", countryiso));
            return Ok(None);
        };

        let mut rows = records.to_vec();
        rows.sort_by(|a, b| b.year().cmp(&a.year()));

        let resource = generate_resource(
            &self.folder,
            &format!("{}_cpi.csv", iso_lower),
            self.configuration.country_description(&country_name),
            rows,
        )?;

        Ok(Some(builder.build(time_period, resource)))
    }

    /// Build the world dataset from every country's records.
    ///
    /// Rows are ordered by year (newest first), then country name.
    pub fn generate_global_dataset(
        &self,
        country_data: &CountryData,
    ) -> ResourceResult<Option<DatasetDescriptor>> {
        let mut all_records: Vec<Record> = country_data.values().flatten().cloned().collect();
        all_records.sort_by(|a, b| {
            b.year()
                .cmp(&a.year())
                .then_with(|| a.country().cmp(b.country()))
        });

        let Some(time_period) = TimePeriod::from_years(all_records.iter().map(Record::year)) else {
            self.log.warning("No records at all, skipping global dataset");
            return Ok(None);
        };

        let mut builder = DatasetBuilder::new(
            format!("global-{}", DATASET_SUFFIX),
            format!("Global - {}", self.configuration.title),
        );
        builder.add_tags(self.configuration.tags.iter().cloned());
        match self.locations.attach(WORLD) {
            Ok(location) => builder.add_location(location),
            Err(e) => {
                self.log.error(format!("Couldn't add world location ({}), skipping global dataset", e));
                return Ok(None);
            }
        }

        let resource = generate_resource(
            &self.folder,
            GLOBAL_FILENAME,
            self.configuration.description_global.clone(),
            all_records,
        )?;

        Ok(Some(builder.build(time_period, resource)))
    }

    /// Full batch: fetch, global dataset, then one dataset per country.
    ///
    /// Only the fetch is fatal. Per-dataset failures are logged and recorded
    /// in the summary.
    pub async fn run(
        &self,
        publisher: &mut dyn Publisher,
        options: &RunOptions,
    ) -> PipelineResult<RunSummary> {
        let country_data = self.get_data_by_country().await?;
        Ok(self.publish_all(&country_data, publisher, options))
    }

    /// Build and publish the global dataset and every (selected) country.
    pub fn publish_all(
        &self,
        country_data: &CountryData,
        publisher: &mut dyn Publisher,
        options: &RunOptions,
    ) -> RunSummary {
        let mut summary = RunSummary {
            countries: country_data.len(),
            ..RunSummary::default()
        };
        let mut receiver = self.log.subscribe();

        self.log.info("🌍 Building global dataset...");
        let global = self.generate_global_dataset(country_data);
        self.finish(global, "global", publisher, options, &mut summary);
        summary.issues.extend(drain_issues(&mut receiver));

        self.log.info("🗺️  Building country datasets...");
        for (countryiso, records) in country_data {
            if let Some(ref filter) = options.countries {
                if !filter.contains(countryiso) {
                    continue;
                }
            }
            self.log.emit(
                LogEntry::new(
                    LogLevel::Info,
                    format!("{} ({} records)", countryiso, records.len()),
                )
                .with_indent(1),
            );
            let dataset = self.generate_dataset(countryiso, records);
            self.finish(dataset, countryiso, publisher, options, &mut summary);
            summary.issues.extend(drain_issues(&mut receiver));
        }

        self.log.success(format!(
            "Published {}, skipped {}, failed {}",
            summary.published.len(),
            summary.skipped.len(),
            summary.failed.len()
        ));
        summary
    }

    /// Publish one generated dataset and record the outcome.
    fn finish(
        &self,
        generated: ResourceResult<Option<DatasetDescriptor>>,
        label: &str,
        publisher: &mut dyn Publisher,
        options: &RunOptions,
        summary: &mut RunSummary,
    ) {
        let mut dataset = match generated {
            Ok(Some(dataset)) => dataset,
            Ok(None) => {
                summary.skipped.push(label.to_string());
                return;
            }
            Err(e) => {
                self.log.error(format!("{}: {}", label, e));
                summary.failed.push((label.to_string(), e.to_string()));
                return;
            }
        };

        if let Some(ref metadata) = options.static_metadata {
            dataset.update_from_static(metadata);
        }

        match publisher.publish(&dataset) {
            Ok(()) => summary.published.push(dataset.name),
            Err(e) => {
                self.log.error(format!("Failed to publish {}: {}", dataset.name, e));
                summary.failed.push((dataset.name, e.to_string()));
            }
        }
    }
}
