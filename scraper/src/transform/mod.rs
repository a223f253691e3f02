//! Transformation module.
//!
//! - Grouper: Validate fetched records and group them by country
//! - Resource: Write CSV resources
//! - Pipeline: Fetch, build datasets, publish

pub mod grouper;
pub mod pipeline;
pub mod resource;

pub use grouper::{group_by_country, records_from_json, MIN_YEAR};
pub use pipeline::*;
pub use resource::generate_resource;
