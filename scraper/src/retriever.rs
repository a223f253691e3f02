//! Download JSON, optionally saving or replaying the raw payload.
//!
//! | Mode        | Network | Saved dir |
//! |-------------|---------|-----------|
//! | default     | read    | untouched |
//! | `save`      | read    | written   |
//! | `use_saved` | none    | read      |
//!
//! Saved files are named after the last path segment of the URL, with `.json`
//! appended when it has no extension (`.../latest/cpi` -> `cpi.json`).

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::{FetchError, FetchResult};
use crate::logs::{log_info, log_success};

/// HTTP downloader with save / use-saved modes.
#[derive(Debug, Clone)]
pub struct Retriever {
    client: Client,
    saved_dir: PathBuf,
    save: bool,
    use_saved: bool,
}

impl Retriever {
    pub fn new(client: Client, saved_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            saved_dir: saved_dir.into(),
            save: false,
            use_saved: false,
        }
    }

    /// Also write every downloaded payload to the saved dir.
    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    /// Read payloads from the saved dir instead of the network.
    pub fn with_use_saved(mut self, use_saved: bool) -> Self {
        self.use_saved = use_saved;
        self
    }

    /// Saved-data path for `url`.
    pub fn saved_path(&self, url: &str) -> FetchResult<PathBuf> {
        Ok(self.saved_dir.join(saved_file_name(url)?))
    }

    /// GET `url` and return the body as text.
    pub async fn download_text(&self, url: &str) -> FetchResult<String> {
        let path = self.saved_path(url)?;

        if self.use_saved {
            log_info(format!("Using saved data {}", path.display()));
            return fs::read_to_string(&path).map_err(|source| FetchError::SavedData { path, source });
        }

        log_info(format!("Downloading {}", url));
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        log_success(format!("Received {} bytes", body.len()));

        if self.save {
            fs::create_dir_all(&self.saved_dir).map_err(|source| FetchError::SavedData {
                path: self.saved_dir.clone(),
                source,
            })?;
            fs::write(&path, &body).map_err(|source| FetchError::SavedData {
                path: path.clone(),
                source,
            })?;
            log_info(format!("Saved to {}", path.display()));
        }

        Ok(body)
    }

    /// GET `url` and parse the body as JSON.
    pub async fn download_json(&self, url: &str) -> FetchResult<Value> {
        let body = self.download_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// File name used for `url` in the saved dir.
fn saved_file_name(url: &str) -> FetchResult<String> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| FetchError::InvalidUrl(format!("{}: no path segment", url)))?;

    if Path::new(segment).extension().is_some() {
        Ok(segment.to_string())
    } else {
        Ok(format!("{}.json", segment))
    }
}
