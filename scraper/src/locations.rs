//! Country-name resolution and catalog location validation.
//!
//! The pipeline only sees the [`Locations`] trait. [`LocationRegistry`] is the
//! shipped implementation, filled from the catalog's group list
//! (`{ "result": [ { "name": "afg", "title": "Afghanistan" }, ... ] }`).

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{FetchError, FetchResult, LocationError};
use crate::models::{CountryData, Location};
use crate::retriever::Retriever;

/// Catalog group name for the global dataset.
pub const WORLD: &str = "world";

/// Location capability injected into the pipeline.
pub trait Locations {
    /// Display name for an ISO3 country code.
    fn country_name(&self, iso3: &str) -> Option<String>;

    /// Resolve `code` to a catalog location, failing if the catalog does not
    /// know it.
    fn attach(&self, code: &str) -> Result<Location, LocationError>;
}

/// In-memory catalog of locations, keyed by lower-case code.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    entries: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct GroupList {
    result: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct Group {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(code, display name)` pairs.
    pub fn from_entries<I, C, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: AsRef<str>,
        N: Into<String>,
    {
        let mut registry = Self::new();
        for (code, name) in entries {
            registry.insert(code.as_ref(), name);
        }
        registry
    }

    /// Parse a catalog group-list payload.
    ///
    /// Groups with neither `title` nor `display_name` are left out, so their
    /// countries are skipped instead of published under a made-up name.
    pub fn from_group_list(value: Value) -> FetchResult<Self> {
        let list: GroupList = serde_json::from_value(value)
            .map_err(|e| FetchError::InvalidLocations(e.to_string()))?;

        Ok(Self::from_entries(list.result.into_iter().filter_map(|group| {
            let title = group.title.or(group.display_name)?;
            Some((group.name, title))
        })))
    }

    /// Download the group list through `retriever`.
    pub async fn fetch(retriever: &Retriever, url: &str) -> FetchResult<Self> {
        let value = retriever.download_json(url).await?;
        Self::from_group_list(value)
    }

    /// Registry derived from the records themselves, plus `world`.
    ///
    /// Used when no catalog group list is configured.
    pub fn from_records(country_data: &CountryData) -> Self {
        let mut registry = Self::from_entries(country_data.iter().filter_map(|(iso3, records)| {
            records.first().map(|r| (iso3.as_str(), r.country().to_string()))
        }));
        registry.insert(WORLD, "World");
        registry
    }

    pub fn insert(&mut self, code: &str, name: impl Into<String>) {
        self.entries.insert(code.to_lowercase(), name.into());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(&code.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Locations for LocationRegistry {
    fn country_name(&self, iso3: &str) -> Option<String> {
        if iso3.len() != 3 {
            return None;
        }
        self.entries.get(&iso3.to_lowercase()).cloned()
    }

    fn attach(&self, code: &str) -> Result<Location, LocationError> {
        let name = code.to_lowercase();
        match self.entries.get(&name) {
            Some(title) => Ok(Location {
                name,
                title: title.clone(),
            }),
            None => Err(LocationError::Unknown(code.to_string())),
        }
    }
}
