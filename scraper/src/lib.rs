//! # CPI scraper - Corruption Perceptions Index datasets for HDX
//!
//! Fetches the Transparency International CPI from its API, splits it by
//! country and writes one CSV dataset per country plus a global one, each
//! with a descriptor ready for the catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CPI API   │────▶│  Retriever  │────▶│   Grouper   │────▶│  Datasets   │
//! │   (JSON)    │     │ (save/use)  │     │  (by ISO3)  │     │ (CSV+JSON)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cpi_scraper::{Configuration, JsonPublisher, LocationRegistry, Pipeline, Retriever, RunOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let configuration = Configuration::read("config/project_configuration.yaml").unwrap();
//!     let retriever = Retriever::new(reqwest::Client::new(), "saved_data");
//!     let locations = LocationRegistry::from_entries([("afg", "Afghanistan"), ("world", "World")]);
//!     let pipeline = Pipeline::new(configuration, retriever, locations, "output");
//!
//!     let mut publisher = JsonPublisher::new("output");
//!     let summary = pipeline.run(&mut publisher, &RunOptions::default()).await.unwrap();
//!     println!("Published {} datasets", summary.published.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Records and dataset descriptors
//! - [`config`] - Project configuration and static metadata
//! - [`retriever`] - HTTP download with saved-data replay
//! - [`validation`] - CPI record schema
//! - [`locations`] - Country names and catalog locations
//! - [`transform`] - Grouping, CSV resources, pipeline
//! - [`publish`] - Publisher seam
//! - [`logs`] - Pipeline log channel and run issues

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Input
pub mod retriever;
pub mod validation;

// Catalog
pub mod locations;
pub mod publish;

// Transformation
pub mod transform;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    FetchError,
    LocationError,
    ResourceError,
    PublishError,
    PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Record,
    CountryData,
    TimePeriod,
    Location,
    DatasetBuilder,
    DatasetDescriptor,
    ResourceDescriptor,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{Configuration, StaticMetadata, DEFAULT_CONFIG_PATH, DEFAULT_STATIC_PATH};

// =============================================================================
// Re-exports - Input
// =============================================================================

pub use retriever::Retriever;
pub use validation::{validate_cpi_record, is_valid_cpi_record};

// =============================================================================
// Re-exports - Catalog
// =============================================================================

pub use locations::{Locations, LocationRegistry, WORLD};
pub use publish::{Publisher, JsonPublisher};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    group_by_country,
    records_from_json,
    generate_resource,
    Pipeline,
    RunOptions,
    RunSummary,
    MIN_YEAR,
};
