//! Domain models for the CPI scraper.
//!
//! - [`Record`] - One country-year CPI observation, key order preserved
//! - [`CountryData`] - Records grouped by ISO3 code
//! - [`TimePeriod`] - Dataset coverage in whole years
//! - [`Location`] - Catalog group a dataset is attached to
//! - [`DatasetDescriptor`] / [`ResourceDescriptor`] - What gets published

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::StaticMetadata;

// =============================================================================
// Record
// =============================================================================

/// One CPI observation for a country and year.
///
/// The full JSON object is kept as fetched (score, rank, sources, ...) so the
/// CSV columns follow the source key order. `iso3`, `year` and `country` are
/// lifted out for grouping and sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    iso3: String,
    year: i32,
    country: String,
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a JSON object.
    ///
    /// Returns a message describing the first missing or mistyped key.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self, String> {
        let iso3 = fields
            .get("iso3")
            .and_then(Value::as_str)
            .ok_or("missing string field 'iso3'")?
            .to_string();
        let year = fields
            .get("year")
            .and_then(Value::as_i64)
            .ok_or("missing integer field 'year'")?;
        let year = i32::try_from(year).map_err(|_| format!("year {} out of range", year))?;
        let country = fields
            .get("country")
            .and_then(Value::as_str)
            .ok_or("missing string field 'country'")?
            .to_string();

        Ok(Self {
            iso3,
            year,
            country,
            fields,
        })
    }

    /// Build a record from any JSON value (must be an object).
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            other => Err(format!("expected object, got {}", json_kind(&other))),
        }
    }

    pub fn iso3(&self) -> &str {
        &self.iso3
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// All fields in source order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Column names in source order.
    pub fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Records grouped by ISO3 code; each group keeps fetch order.
pub type CountryData = BTreeMap<String, Vec<Record>>;

// =============================================================================
// Time Period
// =============================================================================

/// Inclusive coverage of a dataset, 1 January of the first and last year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimePeriod {
    /// Period spanning the smallest and largest of `years`.
    ///
    /// `None` if `years` is empty.
    pub fn from_years<I>(years: I) -> Option<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        let mut bounds: Option<(i32, i32)> = None;
        for year in years {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(year), max.max(year)),
                None => (year, year),
            });
        }
        let (min, max) = bounds?;
        Some(Self {
            start: NaiveDate::from_ymd_opt(min, 1, 1)?,
            end: NaiveDate::from_ymd_opt(max, 1, 1)?,
        })
    }

    /// Catalog form: `[2012-01-01T00:00:00 TO 2024-01-01T23:59:59]`.
    pub fn dataset_date(&self) -> String {
        format!(
            "[{}T00:00:00 TO {}T23:59:59]",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl Serialize for TimePeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dataset_date())
    }
}

// =============================================================================
// Location
// =============================================================================

/// A catalog location (country or `world`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Catalog group name, lower case (`afg`, `world`).
    pub name: String,
    /// Display name.
    #[serde(skip)]
    pub title: String,
}

// =============================================================================
// Descriptors
// =============================================================================

/// A CSV file attached to a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDescriptor {
    /// File name, also used as resource name.
    pub name: String,
    pub description: String,
    pub format: String,
    /// Where the CSV was written.
    pub path: PathBuf,
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Rows as written, in file order.
    #[serde(skip)]
    pub rows: Vec<Record>,
}

impl ResourceDescriptor {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A publishable dataset: metadata plus its single CSV resource.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub title: String,
    #[serde(rename = "dataset_date")]
    pub time_period: TimePeriod,
    pub tags: BTreeSet<String>,
    pub groups: Vec<Location>,
    #[serde(flatten)]
    pub metadata: Option<StaticMetadata>,
    pub resource: ResourceDescriptor,
}

impl DatasetDescriptor {
    /// Merge the static metadata block shared by every dataset.
    pub fn update_from_static(&mut self, metadata: &StaticMetadata) {
        self.metadata = Some(metadata.clone());
    }

    /// The attached location, if any.
    pub fn location(&self) -> Option<&Location> {
        self.groups.first()
    }
}

/// Accumulates dataset fields before the resource exists.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    name: String,
    title: String,
    tags: BTreeSet<String>,
    groups: Vec<Location>,
}

impl DatasetBuilder {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            tags: BTreeSet::new(),
            groups: Vec::new(),
        }
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    pub fn add_location(&mut self, location: Location) {
        if !self.groups.contains(&location) {
            self.groups.push(location);
        }
    }

    pub fn build(self, time_period: TimePeriod, resource: ResourceDescriptor) -> DatasetDescriptor {
        DatasetDescriptor {
            name: self.name,
            title: self.title,
            time_period,
            tags: self.tags,
            groups: self.groups,
            metadata: None,
            resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_key_order() {
        let record = Record::from_value(json!({
            "country": "Afghanistan",
            "iso3": "AFG",
            "year": 2024,
            "score": 17
        }))
        .unwrap();

        assert_eq!(record.iso3(), "AFG");
        assert_eq!(record.year(), 2024);
        assert_eq!(record.country(), "Afghanistan");
        assert_eq!(record.keys(), vec!["country", "iso3", "year", "score"]);
    }

    #[test]
    fn test_record_missing_year() {
        let err = Record::from_value(json!({ "iso3": "AFG", "country": "Afghanistan" }))
            .unwrap_err();
        assert!(err.contains("year"));
    }

    #[test]
    fn test_record_rejects_non_object() {
        let err = Record::from_value(json!([1, 2])).unwrap_err();
        assert!(err.contains("array"));
    }

    #[test]
    fn test_time_period_bounds() {
        let period = TimePeriod::from_years([2015, 2012, 2024]).unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2012, 1, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(
            period.dataset_date(),
            "[2012-01-01T00:00:00 TO 2024-01-01T23:59:59]"
        );
    }

    #[test]
    fn test_time_period_empty() {
        assert!(TimePeriod::from_years(Vec::new()).is_none());
    }

    #[test]
    fn test_descriptor_serialization() {
        let mut builder = DatasetBuilder::new("afg-test", "Afghanistan - Test");
        builder.add_tags(["poverty", "economics", "poverty"]);
        builder.add_location(Location {
            name: "afg".into(),
            title: "Afghanistan".into(),
        });
        let resource = ResourceDescriptor {
            name: "afg_cpi.csv".into(),
            description: "desc".into(),
            format: "csv".into(),
            path: PathBuf::from("afg_cpi.csv"),
            headers: vec!["iso3".into()],
            rows: Vec::new(),
        };
        let period = TimePeriod::from_years([2012]).unwrap();
        let dataset = builder.build(period, resource);

        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(value["name"], "afg-test");
        assert_eq!(value["dataset_date"], "[2012-01-01T00:00:00 TO 2012-01-01T23:59:59]");
        assert_eq!(value["tags"], json!(["economics", "poverty"]));
        assert_eq!(value["groups"], json!([{ "name": "afg" }]));
        assert_eq!(value["resource"]["name"], "afg_cpi.csv");
        assert!(value.get("license_id").is_none());
    }
}
