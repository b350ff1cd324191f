//! Upward propagation from observable sources into the composite state

use std::sync::Arc;

use serde_json::Map;
use tracing::debug;

use mv_core::hash_url::QUERY_KEY;
use mv_core::{view_key, CompositeState, DatasetModel, ObjectState, SetOptions, Subscription};
use mv_views::ViewRegistry;

/// One observable source mirrored into one composite slice
pub(crate) struct StateBinding {
    source: Arc<ObjectState>,
    key: String,
    sync_on_install: bool,
}

impl StateBinding {
    /// The query state plus every view that carries its own state
    pub(crate) fn enumerate(model: &dyn DatasetModel, registry: &ViewRegistry) -> Vec<StateBinding> {
        let mut bindings = vec![StateBinding {
            source: model.query_state(),
            key: QUERY_KEY.to_string(),
            sync_on_install: false,
        }];

        bindings.extend(registry.iter().filter_map(|entry| {
            entry.view.state().map(|source| StateBinding {
                source,
                key: view_key(&entry.id),
                sync_on_install: true,
            })
        }));
        bindings
    }

    /// Copy the current snapshot (silently, if requested) and keep the slice in step
    pub(crate) fn install(self, target: &Arc<CompositeState>) -> Subscription {
        if self.sync_on_install {
            let mut partial = Map::new();
            partial.insert(self.key.clone(), self.source.to_json());
            target.set(partial, SetOptions::silent());
        }

        let source = Arc::downgrade(&self.source);
        let target = Arc::clone(target);
        let key = self.key;
        self.source.on_change(move || {
            if let Some(source) = source.upgrade() {
                debug!("Propagating {}", key);
                target.propagate(&key, source.to_json());
            }
        })
    }
}
