//! Backend registry used to rebuild datasets from serialized state

use std::sync::Arc;

use ahash::AHashMap;
use serde_json::Value;
use tracing::debug;

use mv_core::state::{BACKEND_KEY, URL_KEY};
use mv_core::DatasetModel;

use crate::sources::MemoryDataset;
use crate::DataError;

/// Builds a dataset from an optional source url
pub type BackendConstructor =
    Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn DatasetModel>, DataError> + Send + Sync>;

/// Maps backend type names to dataset constructors
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: AHashMap<String, BackendConstructor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry knowing the `memory` and `csv` backends
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MemoryDataset::BACKEND, |_url| {
            Ok(MemoryDataset::new(Vec::new()) as Arc<dyn DatasetModel>)
        });
        registry.register(MemoryDataset::CSV_BACKEND, |url| match url {
            Some(path) => Ok(MemoryDataset::from_csv(path) as Arc<dyn DatasetModel>),
            None => Err(DataError::MissingUrl(MemoryDataset::CSV_BACKEND.to_string())),
        });
        registry
    }

    pub fn register<F>(&mut self, backend: &str, constructor: F)
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn DatasetModel>, DataError> + Send + Sync + 'static,
    {
        self.constructors.insert(backend.to_string(), Arc::new(constructor));
    }

    pub fn contains(&self, backend: &str) -> bool {
        self.constructors.contains_key(backend)
    }

    /// Rebuild the dataset described by a serialized composite state.
    ///
    /// A missing `backend` means the in-memory backend.
    pub fn restore(&self, state: &Value) -> Result<Arc<dyn DatasetModel>, DataError> {
        let backend = state
            .get(BACKEND_KEY)
            .and_then(Value::as_str)
            .unwrap_or(MemoryDataset::BACKEND);
        let url = state.get(URL_KEY).and_then(Value::as_str);

        let constructor = self
            .constructors
            .get(backend)
            .ok_or_else(|| DataError::UnknownBackend(backend.to_string()))?;

        debug!(backend, url, "Restoring dataset");
        constructor(url)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("BackendRegistry").field("backends", &names).finish()
    }
}
