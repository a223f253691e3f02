//! Project configuration.
//!
//! Two YAML files drive a run:
//!
//! - `config/project_configuration.yaml` -> [`Configuration`]
//! - `config/hdx_dataset_static.yaml` -> [`StaticMetadata`]
//!
//! `CPI_BASE_URL` and `CPI_LOCATIONS_URL` (environment or `.env`) override
//! the URLs from the project file.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Placeholder replaced by the country name in [`Configuration::description`].
pub const COUNTRY_PLACEHOLDER: &str = "(country)";

/// Default location of the project configuration, relative to the crate.
pub const DEFAULT_CONFIG_PATH: &str = "config/project_configuration.yaml";

/// Default location of the static dataset metadata, relative to the crate.
pub const DEFAULT_STATIC_PATH: &str = "config/hdx_dataset_static.yaml";

/// Values consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// CPI API endpoint returning a JSON array of records.
    pub base_url: String,

    /// Catalog group list used to resolve country names and locations.
    #[serde(default)]
    pub locations_url: Option<String>,

    /// Dataset title suffix, e.g. "Corruption Perceptions Index".
    pub title: String,

    /// Tags added to every dataset.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Per-country resource description, with a `(country)` placeholder.
    pub description: String,

    /// Global resource description.
    pub description_global: String,
}

impl Configuration {
    /// Read from a YAML file, then apply environment overrides.
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let mut config = Self::from_yaml_str(&read_file(path.as_ref())?)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML text. No environment overrides.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("CPI_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(url) = env::var("CPI_LOCATIONS_URL") {
            self.locations_url = Some(url);
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("base_url"));
        }
        if self.title.trim().is_empty() {
            return Err(ConfigError::MissingField("title"));
        }
        Ok(())
    }

    /// Resource description for one country.
    pub fn country_description(&self, country_name: &str) -> String {
        self.description.replace(COUNTRY_PLACEHOLDER, country_name)
    }
}

/// Metadata shared by every published dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_update_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StaticMetadata {
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_yaml_str(&read_file(path.as_ref())?)
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

fn read_file(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
