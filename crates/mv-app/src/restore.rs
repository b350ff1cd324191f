//! Rebuilding a coordinator from a serialized composite state

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use mv_core::{Element, Settings};
use mv_data::{BackendRegistry, DataError};

use crate::{Coordinator, CoordinatorOptions};

/// Errors that prevent a restore
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("cannot rebuild dataset: {0}")]
    Backend(#[from] DataError),

    #[error(transparent)]
    Coordinator(#[from] mv_core::Error),
}

/// Builds coordinators from `to_json()` snapshots
#[derive(Debug, Clone)]
pub struct RestoreFactory {
    backends: BackendRegistry,
    settings: Settings,
}

impl RestoreFactory {
    pub fn new(backends: BackendRegistry) -> Self {
        Self {
            backends,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Rebuild the dataset named by `backend`/`url` and a coordinator over it
    /// with `serialized` as the caller overrides
    pub fn restore(&self, serialized: &Value, element: Element) -> Result<Coordinator, RestoreError> {
        let model = self.backends.restore(serialized)?;
        info!(backend = model.backend_type(), "Restoring coordinator");

        let options = CoordinatorOptions::new()
            .model(model)
            .element(element)
            .state(serialized.clone())
            .settings(self.settings.clone());
        Ok(Coordinator::new(options)?)
    }
}

impl Default for RestoreFactory {
    fn default() -> Self {
        Self::new(BackendRegistry::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_data::MemoryDataset;
    use serde_json::json;

    fn session() -> Coordinator {
        Coordinator::new(
            CoordinatorOptions::new()
                .model(MemoryDataset::new(Vec::new()))
                .element(Element::new("root"))
                .fragment("view-graph=%7B%22series%22%3A%5B%22price%22%5D%7D"),
        )
        .unwrap()
    }

    #[test]
    fn test_restore_round_trip() {
        let original = session();
        assert!(original.switch_view("map"));
        original
            .registry()
            .get("grid")
            .and_then(|entry| entry.view.state())
            .unwrap()
            .set_key("fitColumns", json!(true));

        let serialized = original.to_json();
        let restored = RestoreFactory::default()
            .restore(&serialized, Element::new("copy"))
            .unwrap();

        assert_eq!(restored.to_json(), serialized);
        assert_eq!(restored.navigation().active_view().as_deref(), Some("map"));
        assert_eq!(restored.state().view_state("graph").unwrap()["series"], json!(["price"]));
    }

    #[test]
    fn test_restore_keeps_read_only() {
        let serialized = json!({"readOnly": true, "currentView": "graph"});
        let restored = RestoreFactory::default()
            .restore(&serialized, Element::new("root"))
            .unwrap();

        assert!(restored.state().is_read_only());
        assert!(restored.shell().is_read_only());
        assert_eq!(restored.state().get("backend"), Some(json!("memory")));
    }

    #[test]
    fn test_restore_unknown_backend_fails() {
        let err = RestoreFactory::default()
            .restore(&json!({"backend": "elasticsearch"}), Element::new("root"))
            .err();
        assert!(matches!(err, Some(RestoreError::Backend(DataError::UnknownBackend(_)))));
    }
}
