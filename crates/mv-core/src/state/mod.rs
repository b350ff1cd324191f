//! Observable state objects

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::events::{EventEmitter, Subscription};

mod composite;

pub use composite::{
    view_key, CompositeState, StateLayers, BACKEND_KEY, CURRENT_VIEW_KEY, READ_ONLY_KEY, URL_KEY,
};

/// Options for [`ObjectState::set`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge without emitting a change event
    pub silent: bool,
}

impl SetOptions {
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// A JSON object whose changes can be observed
///
/// Used for the dataset query state, every sub-view's own state, and as the
/// storage behind [`CompositeState`]. Change events carry no payload;
/// observers re-read through [`ObjectState::get`] or [`ObjectState::to_json`].
#[derive(Debug, Default)]
pub struct ObjectState {
    attributes: RwLock<Map<String, Value>>,
    changed: EventEmitter<()>,
}

impl ObjectState {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            attributes: RwLock::new(attributes),
            changed: EventEmitter::new(),
        }
    }

    /// Build from a JSON value, which must be an object
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(Self::new(into_object(value)?))
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.read().contains_key(key)
    }

    /// Merge `partial` into the state, replacing values key by key.
    ///
    /// Unless `options.silent` is set, exactly one change event is emitted
    /// after the lock is released.
    pub fn set(&self, partial: Map<String, Value>, options: SetOptions) {
        {
            let mut attributes = self.attributes.write();
            for (key, value) in partial {
                attributes.insert(key, value);
            }
        }

        if !options.silent {
            self.trigger_change();
        }
    }

    /// [`ObjectState::set`] for a `json!` literal
    pub fn set_json(&self, partial: Value, options: SetOptions) -> Result<()> {
        self.set(into_object(partial)?, options);
        Ok(())
    }

    /// Set a single key and emit a change event
    pub fn set_key(&self, key: impl Into<String>, value: Value) {
        let mut partial = Map::new();
        partial.insert(key.into(), value);
        self.set(partial, SetOptions::default());
    }

    /// Remove a key, emitting a change event if it was present
    pub fn unset(&self, key: &str) -> Option<Value> {
        let removed = self.attributes.write().remove(key);
        if removed.is_some() {
            self.trigger_change();
        }
        removed
    }

    /// Full snapshot of the state
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.read().clone())
    }

    /// Snapshot as a map
    pub fn attributes(&self) -> Map<String, Value> {
        self.attributes.read().clone()
    }

    /// Subscribe to change events
    pub fn on_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.changed.subscribe(move |_| handler())
    }

    /// Emit a change event without modifying anything
    pub fn trigger_change(&self) {
        self.changed.emit(&());
    }
}

/// Unwrap a JSON object, rejecting every other kind of value
pub fn into_object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::NotAnObject(json_kind(&other).to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(state: &ObjectState) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sub = state.on_change(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let state = ObjectState::default();
        for value in [json!(null), json!(3.5), json!("grid"), json!([1, {"a": []}]), json!({"nested": {"x": true}})] {
            state.set_key("k", value.clone());
            assert_eq!(state.get("k"), Some(value));
        }
    }

    #[test]
    fn test_set_emits_once_per_call() {
        let state = ObjectState::default();
        let (count, _sub) = counted(&state);

        state.set_json(json!({"a": 1, "b": 2, "c": 3}), SetOptions::default()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_silent_set_does_not_emit() {
        let state = ObjectState::default();
        let (count, _sub) = counted(&state);

        state.set_json(json!({"a": 1}), SetOptions::silent()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(state.get("a"), Some(json!(1)));

        state.trigger_change();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_replaces_whole_values() {
        let state = ObjectState::from_json(json!({"view": {"a": 1, "b": 2}})).unwrap();
        state.set_key("view", json!({"b": 3}));
        assert_eq!(state.to_json(), json!({"view": {"b": 3}}));
    }

    #[test]
    fn test_handler_can_read_state_during_change() {
        let state = Arc::new(ObjectState::default());
        let seen = Arc::new(RwLock::new(None));

        let reader = Arc::clone(&state);
        let sink = Arc::clone(&seen);
        let _sub = state.on_change(move || {
            *sink.write() = reader.get("currentView");
        });

        state.set_key("currentView", json!("map"));
        assert_eq!(*seen.read(), Some(json!("map")));
    }

    #[test]
    fn test_non_object_partial_is_rejected() {
        let state = ObjectState::default();
        let err = state.set_json(json!([1, 2]), SetOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotAnObject(_)));
        assert_eq!(state.to_json(), json!({}));
    }

    #[test]
    fn test_unset_only_emits_when_present() {
        let state = ObjectState::from_json(json!({"a": 1})).unwrap();
        let (count, _sub) = counted(&state);

        assert_eq!(state.unset("missing"), None);
        assert_eq!(state.unset("a"), Some(json!(1)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
