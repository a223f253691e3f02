//! Turn the fetched payload into per-country record groups.
//!
//! ```text
//! JSON array (fetch order)            CountryData
//! ┌──────────────────────────┐       ┌──────────────────────────────┐
//! │ AFG 2011                 │  ✗    │ AFG: [2012, 2015, 2024]      │
//! │ AFG 2012                 │       │ ARG: [2024]                  │
//! │ ARG 2024                 │  →    └──────────────────────────────┘
//! │ AFG 2015                 │
//! │ AFG 2024                 │
//! └──────────────────────────┘
//! ```
//!
//! Records before [`MIN_YEAR`] are dropped. Within a group, fetch order is kept.

use serde_json::Value;

use crate::error::{FetchError, FetchResult};
use crate::models::{json_kind, CountryData, Record};
use crate::validation::validate_cpi_record;

/// Earliest year published.
pub const MIN_YEAR: i32 = 2012;

/// Validate and convert a fetched payload into records.
///
/// Elements whose integer `year` is before [`MIN_YEAR`] are dropped unchecked.
/// Fails on the first remaining element that is not a valid CPI record;
/// `index` is the element's position in the payload.
pub fn records_from_json(payload: Value) -> FetchResult<Vec<Record>> {
    let items = match payload {
        Value::Array(items) => items,
        other => return Err(FetchError::NotAnArray(json_kind(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .filter(|(_, item)| !before_min_year(item))
        .map(|(index, item)| {
            validate_cpi_record(&item)
                .map_err(|errors| FetchError::InvalidRecord { index, errors })?;
            Record::from_value(item).map_err(|reason| FetchError::InvalidRecord {
                index,
                errors: vec![reason],
            })
        })
        .collect()
}

fn before_min_year(item: &Value) -> bool {
    item.get("year")
        .and_then(Value::as_i64)
        .map_or(false, |year| year < i64::from(MIN_YEAR))
}

/// Group records by ISO3, keeping only [`MIN_YEAR`] onward.
pub fn group_by_country(records: impl IntoIterator<Item = Record>) -> CountryData {
    let mut country_data = CountryData::new();

    for record in records {
        if record.year() >= MIN_YEAR {
            country_data
                .entry(record.iso3().to_string())
                .or_default()
                .push(record);
        }
    }

    country_data
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(iso3: &str, country: &str, year: i64) -> Record {
        Record::from_value(json!({ "country": country, "iso3": iso3, "year": year, "score": 1 }))
            .unwrap()
    }

    #[test]
    fn test_filters_before_min_year() {
        let records = vec![
            record("AFG", "Afghanistan", 2011),
            record("AFG", "Afghanistan", 2012),
            record("AFG", "Afghanistan", 2024),
            record("ARG", "Argentina", 1999),
        ];

        let grouped = group_by_country(records);

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["AFG"].len(), 2);
        assert!(!grouped.contains_key("ARG"));
    }

    #[test]
    fn test_keeps_fetch_order_within_group() {
        let records = vec![
            record("AFG", "Afghanistan", 2015),
            record("ARG", "Argentina", 2013),
            record("AFG", "Afghanistan", 2012),
            record("AFG", "Afghanistan", 2024),
        ];

        let grouped = group_by_country(records);
        let years: Vec<i32> = grouped["AFG"].iter().map(Record::year).collect();
        assert_eq!(years, vec![2015, 2012, 2024]);
        assert_eq!(grouped["ARG"].len(), 1);
    }

    #[test]
    fn test_no_record_lost_or_duplicated() {
        let mut records = Vec::new();
        for year in 2005..2025 {
            records.push(record("AFG", "Afghanistan", year));
            records.push(record("ALB", "Albania", year));
        }
        let kept = records.iter().filter(|r| r.year() >= MIN_YEAR).count();

        let grouped = group_by_country(records);

        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, kept);
        for (iso3, group) in &grouped {
            assert!(group.iter().all(|r| r.iso3() == iso3));
            assert!(group.iter().all(|r| r.year() >= MIN_YEAR));
        }
    }

    #[test]
    fn test_records_from_json() {
        let payload = json!([
            { "country": "Afghanistan", "iso3": "AFG", "year": 2024, "score": 17 },
            { "country": "Argentina", "iso3": "ARG", "year": 2024, "score": 37 }
        ]);
        let records = records_from_json(payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].iso3(), "ARG");
    }

    #[test]
    fn test_records_from_json_not_array() {
        let err = records_from_json(json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, FetchError::NotAnArray("object")));
    }

    #[test]
    fn test_records_from_json_invalid_element() {
        let payload = json!([
            { "country": "Afghanistan", "iso3": "AFG", "year": 2024 },
            { "country": "Argentina", "iso3": "ARG" }
        ]);
        let err = records_from_json(payload).unwrap_err();
        assert!(matches!(err, FetchError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn test_old_records_dropped_before_validation() {
        let payload = json!([
            { "country": "Afghanistan", "iso3": "AFG", "year": 2024, "score": 17 },
            { "country": "Afghanistan", "iso3": "AFG", "year": 999 },
            { "iso3": "AFG", "year": 2005 }
        ]);
        let grouped = records_from_json(payload).map(group_by_country).unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["AFG"].len(), 1);
    }

    #[test]
    fn test_invalid_index_counts_dropped_elements() {
        let payload = json!([
            { "country": "Afghanistan", "iso3": "AFG", "year": 2011 },
            { "country": "Argentina", "iso3": "arg", "year": 2020 }
        ]);
        let err = records_from_json(payload).unwrap_err();
        assert!(matches!(err, FetchError::InvalidRecord { index: 1, .. }));
    }
}
