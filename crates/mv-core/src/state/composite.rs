//! The composite state aggregated from query, view and UI slices

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{ObjectState, SetOptions};
use crate::error::Result;
use crate::events::Subscription;
use crate::hash_url::{FragmentParams, GRAPH_KEY, LEGACY_GRAPH_KEY, LEGACY_QUERY_KEY, QUERY_KEY};

pub const CURRENT_VIEW_KEY: &str = "currentView";
pub const READ_ONLY_KEY: &str = "readOnly";
pub const BACKEND_KEY: &str = "backend";
pub const URL_KEY: &str = "url";

/// Slice key for the view registered as `id`
pub fn view_key(id: &str) -> String {
    format!("view-{id}")
}

/// The three construction layers, lowest precedence first
#[derive(Debug, Clone, Default)]
pub struct StateLayers {
    pub defaults: Map<String, Value>,
    pub url: Map<String, Value>,
    pub initial: Map<String, Value>,
}

impl StateLayers {
    /// Defaults derived from the dataset
    pub fn defaults(query: Value, backend: &str, url: Option<&str>) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert(QUERY_KEY.into(), query);
        defaults.insert(GRAPH_KEY.into(), Value::Object(Map::new()));
        defaults.insert(BACKEND_KEY.into(), Value::String(backend.to_string()));
        defaults.insert(
            URL_KEY.into(),
            url.map_or(Value::Null, |url| Value::String(url.to_string())),
        );
        defaults.insert(CURRENT_VIEW_KEY.into(), Value::Null);
        defaults.insert(READ_ONLY_KEY.into(), Value::Bool(false));
        defaults
    }

    /// Overrides read from the URL fragment
    ///
    /// Always yields `query` and `view-graph`. Malformed JSON is logged and
    /// replaced: `query` by `query_fallback`, `view-graph` by `{}`.
    pub fn from_fragment(params: &FragmentParams, query_fallback: &Value) -> Map<String, Value> {
        let query = match params.decode_json_with_legacy(QUERY_KEY, LEGACY_QUERY_KEY) {
            Ok(Some(query)) => query,
            Ok(None) => query_fallback.clone(),
            Err(e) => {
                warn!("Ignoring fragment query: {}", e);
                query_fallback.clone()
            }
        };

        let graph = match params.decode_json_with_legacy(GRAPH_KEY, LEGACY_GRAPH_KEY) {
            Ok(Some(graph)) => graph,
            Ok(None) => Value::Object(Map::new()),
            Err(e) => {
                warn!("Ignoring fragment graph state: {}", e);
                Value::Object(Map::new())
            }
        };

        let mut overrides = Map::new();
        overrides.insert(QUERY_KEY.into(), query);
        overrides.insert(GRAPH_KEY.into(), graph);
        overrides
    }

    /// Merge the layers; later layers replace earlier ones key by key
    pub fn merge(self) -> Map<String, Value> {
        let mut merged = self.defaults;
        merged.extend(self.url);
        merged.extend(self.initial);
        merged
    }
}

/// Serializable aggregate of every slice of a session
///
/// Written by the coordinator in response to upstream changes and by
/// navigation. Observers subscribe with [`CompositeState::on_change`] and
/// re-read the slices they care about.
#[derive(Debug, Default)]
pub struct CompositeState {
    inner: ObjectState,
}

impl CompositeState {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            inner: ObjectState::new(attributes),
        }
    }

    /// Build from the three construction layers
    pub fn from_layers(layers: StateLayers) -> Self {
        let merged = layers.merge();
        debug!(slices = merged.len(), "Assembled composite state");
        Self::new(merged)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    pub fn set(&self, partial: Map<String, Value>, options: SetOptions) {
        self.inner.set(partial, options);
    }

    pub fn set_json(&self, partial: Value, options: SetOptions) -> Result<()> {
        self.inner.set_json(partial, options)
    }

    pub fn set_key(&self, key: impl Into<String>, value: Value) {
        self.inner.set_key(key, value);
    }

    pub fn to_json(&self) -> Value {
        self.inner.to_json()
    }

    pub fn on_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.on_change(handler)
    }

    pub fn trigger_change(&self) {
        self.inner.trigger_change();
    }

    /// Copy an upstream snapshot into `key`, then emit one aggregate change.
    ///
    /// Observers see exactly one change per call regardless of whether the
    /// upstream emitted anything itself.
    pub fn propagate(&self, key: &str, snapshot: Value) {
        let mut partial = Map::new();
        partial.insert(key.to_string(), snapshot);
        self.inner.set(partial, SetOptions::silent());
        self.inner.trigger_change();
    }

    pub fn query(&self) -> Value {
        self.get(QUERY_KEY).unwrap_or(Value::Null)
    }

    pub fn view_state(&self, id: &str) -> Option<Value> {
        self.get(&view_key(id))
    }

    pub fn current_view(&self) -> Option<String> {
        match self.get(CURRENT_VIEW_KEY) {
            Some(Value::String(id)) => Some(id),
            _ => None,
        }
    }

    pub fn set_current_view(&self, id: &str) {
        self.set_key(CURRENT_VIEW_KEY, Value::String(id.to_string()));
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.get(READ_ONLY_KEY), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_url::HashUrlCodec;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture is not an object"),
        }
    }

    fn assemble(fragment: &str, initial: Value) -> CompositeState {
        let query_default = json!({"q": "", "from": 0, "size": 100});
        let params = HashUrlCodec::new(fragment).parse();
        CompositeState::from_layers(StateLayers {
            defaults: StateLayers::defaults(query_default.clone(), "memory", Some("data.csv")),
            url: StateLayers::from_fragment(&params, &query_default),
            initial: object(initial),
        })
    }

    #[test]
    fn test_defaults_when_nothing_is_supplied() {
        let state = assemble("", json!({}));
        assert_eq!(
            state.to_json(),
            json!({
                "query": {"q": "", "from": 0, "size": 100},
                "view-graph": {},
                "backend": "memory",
                "url": "data.csv",
                "currentView": null,
                "readOnly": false
            })
        );
        assert_eq!(state.current_view(), None);
        assert!(!state.is_read_only());
    }

    #[test]
    fn test_fragment_overrides_defaults() {
        let state = assemble("query=%7B%22a%22%3A1%7D&view-graph=%7B%22b%22%3A2%7D", json!({}));
        assert_eq!(state.query(), json!({"a": 1}));
        assert_eq!(state.get("view-graph"), Some(json!({"b": 2})));
    }

    #[test]
    fn test_legacy_keys() {
        let state = assemble("graph=%7B%7D&reclineQuery=%7B%22q%22%3A%22x%22%7D", json!({}));
        assert_eq!(state.get("view-graph"), Some(json!({})));
        assert_eq!(state.query(), json!({"q": "x"}));

        let both = assemble("graph=%7B%22old%22%3A1%7D&view-graph=%7B%22new%22%3A1%7D", json!({}));
        assert_eq!(both.get("view-graph"), Some(json!({"new": 1})));
    }

    #[test]
    fn test_malformed_fragment_recovers() {
        let state = assemble("query=%7Boops&view-graph=%5B", json!({}));
        assert_eq!(state.query(), json!({"q": "", "from": 0, "size": 100}));
        assert_eq!(state.get("view-graph"), Some(json!({})));
    }

    #[test]
    fn test_initial_state_wins_over_fragment() {
        let state = assemble(
            "view-graph=%7B%22b%22%3A2%7D",
            json!({"view-graph": {"c": 3}, "currentView": "map", "readOnly": true}),
        );
        assert_eq!(state.get("view-graph"), Some(json!({"c": 3})));
        assert_eq!(state.current_view().as_deref(), Some("map"));
        assert!(state.is_read_only());
    }

    #[test]
    fn test_propagate_emits_exactly_once() {
        let state = CompositeState::default();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let _sub = state.on_change(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        state.propagate(&view_key("grid"), json!({"hiddenFields": ["a"]}));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(state.view_state("grid"), Some(json!({"hiddenFields": ["a"]})));
    }

    #[test]
    fn test_non_string_current_view_is_ignored() {
        let state = CompositeState::new(object(json!({"currentView": 3})));
        assert_eq!(state.current_view(), None);
    }
}
