//! Error types for the CPI scraper.
//!
//! One enum per concern:
//!
//! - [`ConfigError`] - Project configuration and static metadata loading
//! - [`FetchError`] - Downloading and decoding the CPI payload
//! - [`LocationError`] - Catalog location lookups
//! - [`ResourceError`] - Writing CSV resources
//! - [`PublishError`] - Handing datasets to the publisher
//! - [`PipelineError`] - Errors that abort a command
//!
//! Fatal errors convert into [`PipelineError`] via `From` implementations,
//! so `?` works across module boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML could not be parsed into the expected shape.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required field is empty.
    #[error("Configuration field '{0}' must not be empty")]
    MissingField(&'static str),
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while retrieving and decoding the source data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Saved data could not be read or written.
    #[error("Saved data error for {}: {source}", .path.display())]
    SavedData {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// URL has no usable file name for saved data.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Body is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is valid JSON but not a list of records.
    #[error("Expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    /// A record failed schema validation.
    #[error("Record {index} is invalid: {}", .errors.join("; "))]
    InvalidRecord { index: usize, errors: Vec<String> },

    /// Location list payload is not in the expected shape.
    #[error("Invalid location list: {0}")]
    InvalidLocations(String),
}

// =============================================================================
// Location Errors
// =============================================================================

/// Errors from the catalog location registry.
#[derive(Debug, Error, PartialEq)]
pub enum LocationError {
    /// The catalog does not know this location.
    #[error("Unknown location: {0}")]
    Unknown(String),
}

// =============================================================================
// Resource Errors
// =============================================================================

/// Errors while writing a CSV resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Failed to write the file.
    #[error("Failed to write resource: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Nothing to write.
    #[error("Resource {0} has no rows")]
    Empty(String),

    /// A row does not have the same columns as the first row.
    #[error("Row {row} has columns [{}], expected [{}]", .found.join(", "), .expected.join(", "))]
    SchemaMismatch {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

// =============================================================================
// Publish Errors
// =============================================================================

/// Errors while publishing a dataset.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Failed to write the descriptor.
    #[error("Failed to write dataset descriptor: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the descriptor.
    #[error("Failed to serialize dataset descriptor: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Errors that abort a command.
///
/// [`crate::transform::pipeline::Pipeline::run`] only fails on the fetch;
/// per-dataset location, resource and publish failures are logged and land
/// in the run summary. The remaining variants come from the command line.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration or static metadata could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Records or locations could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A single requested dataset could not be written.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Output directory could not be created.
    #[error("Output directory error: {0}")]
    Io(#[from] std::io::Error),

    /// Command output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// No records from the minimum year onward for this country.
    #[error("No records from 2012 onward for {0}")]
    NoRecords(String),

    /// The requested dataset was skipped (unknown country or location).
    #[error("Dataset for {0} was skipped")]
    Skipped(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for resource generation.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Result type for publishing.
pub type PublishResult<T> = Result<T, PublishError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let fetch_err = FetchError::NotAnArray("object");
        let pipeline_err: PipelineError = fetch_err.into();
        assert!(pipeline_err.to_string().contains("JSON array"));

        let resource_err = ResourceError::Empty("afg_cpi.csv".into());
        let pipeline_err: PipelineError = resource_err.into();
        assert!(pipeline_err.to_string().contains("afg_cpi.csv"));
    }

    #[test]
    fn test_command_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let pipeline_err: PipelineError = io_err.into();
        assert!(matches!(pipeline_err, PipelineError::Io(_)));

        let config_err: PipelineError = ConfigError::MissingField("base_url").into();
        assert!(config_err.to_string().contains("base_url"));

        assert_eq!(
            PipelineError::NoRecords("XKX".into()).to_string(),
            "No records from 2012 onward for XKX"
        );
        assert_eq!(
            PipelineError::Skipped("ATL".into()).to_string(),
            "Dataset for ATL was skipped"
        );
    }

    #[test]
    fn test_schema_mismatch_format() {
        let err = ResourceError::SchemaMismatch {
            row: 2,
            expected: vec!["iso3".into(), "year".into()],
            found: vec!["iso3".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 2"));
        assert!(msg.contains("expected [iso3, year]"));
    }

    #[test]
    fn test_invalid_record_lists_errors() {
        let err = FetchError::InvalidRecord {
            index: 4,
            errors: vec!["missing year".into(), "bad iso3".into()],
        };
        assert_eq!(err.to_string(), "Record 4 is invalid: missing year; bad iso3");
    }
}
