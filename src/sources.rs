//! Loading of already-parsed item collections.
//!
//! Fetching and markup parsing happen upstream; this only reads the JSON
//! mapping `id -> record` those collaborators produce.

use std::path::PathBuf;

use crate::items::ItemCollection;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub trait ItemSource {
    fn name(&self) -> String;
    fn load(&self) -> Result<ItemCollection, SourceError>;
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ItemSource for JsonFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ItemCollection, SourceError> {
        let data = std::fs::read(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let items: ItemCollection =
            serde_json::from_slice(&data).map_err(|source| SourceError::Json {
                path: self.path.clone(),
                source,
            })?;

        log::debug!("loaded {} items from {}", items.len(), self.name());
        Ok(items)
    }
}

/// Load every source in order.
pub fn load_all<S: ItemSource>(sources: &[S]) -> Result<Vec<ItemCollection>, SourceError> {
    sources.iter().map(ItemSource::load).collect()
}
