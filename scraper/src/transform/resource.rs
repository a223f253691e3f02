//! CSV resource generation.
//!
//! Headers are the keys of the first row, in source order. Every other row
//! must carry exactly the same key set; a row with extra or missing keys is
//! rejected with [`ResourceError::SchemaMismatch`] instead of being written
//! misaligned.
//!
//! The CSV is built in memory and written with a single `fs::write`, so a
//! failed generation leaves no partial file behind.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ResourceError, ResourceResult};
use crate::models::{Record, ResourceDescriptor};

/// Column headers shared by every row.
pub fn headers_of(rows: &[Record]) -> ResourceResult<Vec<String>> {
    let first = rows.first().ok_or_else(|| ResourceError::Empty("rows".to_string()))?;
    let headers = first.keys();

    for (row, record) in rows.iter().enumerate().skip(1) {
        let same_columns = record.fields().len() == headers.len()
            && headers.iter().all(|h| record.fields().contains_key(h));
        if !same_columns {
            return Err(ResourceError::SchemaMismatch {
                row,
                expected: headers,
                found: record.keys(),
            });
        }
    }

    Ok(headers)
}

/// Render rows as CSV bytes, `\n` terminated.
pub fn to_csv(headers: &[String], rows: &[Record]) -> ResourceResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in rows {
        writer.write_record(headers.iter().map(|h| cell(record.get(h))))?;
    }

    writer.into_inner().map_err(|e| {
        let error = e.error();
        ResourceError::Io(std::io::Error::new(error.kind(), error.to_string()))
    })
}

/// Write `rows` to `folder/filename` and describe the result.
pub fn generate_resource(
    folder: &Path,
    filename: &str,
    description: impl Into<String>,
    rows: Vec<Record>,
) -> ResourceResult<ResourceDescriptor> {
    if rows.is_empty() {
        return Err(ResourceError::Empty(filename.to_string()));
    }
    let headers = headers_of(&rows)?;
    let bytes = to_csv(&headers, &rows)?;

    let path = folder.join(filename);
    fs::write(&path, bytes)?;

    Ok(ResourceDescriptor {
        name: filename.to_string(),
        description: description.into(),
        format: "csv".to_string(),
        path,
        headers,
        rows,
    })
}

/// Text form of one JSON value.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_headers_follow_first_row() {
        let rows = vec![
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2024, "score": 42 })),
            record(json!({ "iso3": "ALB", "country": "Albania", "score": 36, "year": 2015 })),
        ];
        assert_eq!(headers_of(&rows).unwrap(), vec!["country", "iso3", "year", "score"]);
    }

    #[test]
    fn test_heterogeneous_rows_rejected() {
        let rows = vec![
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2024, "score": 42 })),
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2015, "rank": 88 })),
        ];
        let err = headers_of(&rows).unwrap_err();
        match err {
            ResourceError::SchemaMismatch { row, found, .. } => {
                assert_eq!(row, 1);
                assert!(found.contains(&"rank".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cell_rendering() {
        let rows = vec![record(json!({
            "country": "Bosnia, Herzegovina",
            "iso3": "BIH",
            "year": 2024,
            "score": 33.5,
            "sources": null,
            "flag": true
        }))];
        let headers = headers_of(&rows).unwrap();
        let csv = String::from_utf8(to_csv(&headers, &rows).unwrap()).unwrap();
        assert_eq!(
            csv,
            "country,iso3,year,score,sources,flag\n\"Bosnia, Herzegovina\",BIH,2024,33.5,,true\n"
        );
    }

    #[test]
    fn test_generate_resource_writes_file() {
        let dir = tempdir().unwrap();
        let rows = vec![
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2024 })),
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2015 })),
        ];

        let resource = generate_resource(dir.path(), "alb_cpi.csv", "Albania CPI", rows).unwrap();

        assert_eq!(resource.name, "alb_cpi.csv");
        assert_eq!(resource.row_count(), 2);
        let written = fs::read_to_string(dir.path().join("alb_cpi.csv")).unwrap();
        assert_eq!(written, "country,iso3,year\nAlbania,ALB,2024\nAlbania,ALB,2015\n");
    }

    #[test]
    fn test_failed_generation_leaves_no_file() {
        let dir = tempdir().unwrap();
        let rows = vec![
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2024 })),
            record(json!({ "country": "Albania", "iso3": "ALB", "year": 2015, "extra": 1 })),
        ];

        assert!(generate_resource(dir.path(), "alb_cpi.csv", "", rows).is_err());
        assert!(!dir.path().join("alb_cpi.csv").exists());
    }

    #[test]
    fn test_empty_rows() {
        let dir = tempdir().unwrap();
        let err = generate_resource(dir.path(), "x.csv", "", Vec::new()).unwrap_err();
        assert!(matches!(err, ResourceError::Empty(_)));
    }
}
