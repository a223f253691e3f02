//! Hand finished datasets to the catalog.
//!
//! Uploading to a remote catalog is left to an external collaborator; the
//! shipped [`JsonPublisher`] writes each descriptor as `{name}.json` next to
//! its CSV so the upload step can pick both up.

use std::fs;
use std::path::PathBuf;

use crate::error::PublishResult;
use crate::logs::log_success;
use crate::models::DatasetDescriptor;

/// Receives every dataset the pipeline produces.
pub trait Publisher {
    fn publish(&mut self, dataset: &DatasetDescriptor) -> PublishResult<()>;
}

/// Writes pretty-printed descriptors into a folder.
#[derive(Debug, Clone)]
pub struct JsonPublisher {
    folder: PathBuf,
    published: Vec<PathBuf>,
}

impl JsonPublisher {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            published: Vec::new(),
        }
    }

    /// Descriptor files written so far, in publish order.
    pub fn published(&self) -> &[PathBuf] {
        &self.published
    }
}

impl Publisher for JsonPublisher {
    fn publish(&mut self, dataset: &DatasetDescriptor) -> PublishResult<()> {
        fs::create_dir_all(&self.folder)?;
        let path = self.folder.join(format!("{}.json", dataset.name));
        let json = serde_json::to_string_pretty(dataset)?;
        fs::write(&path, json)?;

        log_success(format!("💾 {} -> {}", dataset.name, path.display()));
        self.published.push(path);
        Ok(())
    }
}
