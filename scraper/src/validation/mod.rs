//! JSON Schema validation for fetched CPI records.
//!
//! The record schema is embedded at compile time from
//! `schemas/cpi-record.json`. It only pins the three keys the pipeline
//! relies on (`iso3`, `year`, `country`); score and rank fields pass through.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use cpi_scraper::validate_cpi_record;
//!
//! let record = json!({ "country": "Afghanistan", "iso3": "AFG", "year": 2024, "score": 17 });
//! assert!(validate_cpi_record(&record).is_ok());
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

/// Draft-7 validator compiled once from the embedded schema.
static CPI_RECORD_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/cpi-record.json"))
        .expect("Invalid embedded schema");
    jsonschema::draft7::new(&schema).expect("Invalid embedded schema")
});

/// Validate one record against the CPI record schema.
///
/// Returns every validation error message when invalid.
pub fn validate_cpi_record(data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = CPI_RECORD_VALIDATOR
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid_cpi_record(data: &Value) -> bool {
    CPI_RECORD_VALIDATOR.is_valid(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_record() {
        let record = json!({
            "country": "Afghanistan",
            "iso3": "AFG",
            "region": "AP",
            "year": 2024,
            "score": 17,
            "rank": 165
        });
        assert!(is_valid_cpi_record(&record));
    }

    #[test]
    fn test_lowercase_iso3_invalid() {
        let record = json!({ "country": "Afghanistan", "iso3": "afg", "year": 2024 });
        assert!(!is_valid_cpi_record(&record));
    }

    #[test]
    fn test_string_year_invalid() {
        let record = json!({ "country": "Afghanistan", "iso3": "AFG", "year": "2024" });
        let errors = validate_cpi_record(&record).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_missing_fields_reported() {
        let errors = validate_cpi_record(&json!({ "score": 10 })).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("iso3")));
    }

    #[test]
    fn test_validator_reused_across_records() {
        for year in 2012..2025 {
            let record = json!({ "country": "Albania", "iso3": "ALB", "year": year });
            assert!(validate_cpi_record(&record).is_ok());
        }
        assert!(validate_cpi_record(&json!({ "country": "", "iso3": "ALB", "year": 2024 })).is_err());
    }
}
