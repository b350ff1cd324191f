//! Ordered set of views taking part in a session

use std::sync::Arc;

use ahash::AHashMap;
use tracing::warn;

use crate::SubView;

/// One registered view
#[derive(Clone)]
pub struct ViewEntry {
    pub id: String,
    pub label: String,
    pub view: Arc<dyn SubView>,
}

impl ViewEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>, view: Arc<dyn SubView>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            view,
        }
    }
}

impl std::fmt::Debug for ViewEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEntry")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish()
    }
}

/// Immutable, ordered registry of views keyed by unique id
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    entries: Vec<ViewEntry>,
    index: AHashMap<String, usize>,
}

impl ViewRegistry {
    /// Build from entries in display order. Later entries reusing an id are dropped.
    pub fn new(entries: Vec<ViewEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            if registry.index.contains_key(&entry.id) {
                warn!("Ignoring duplicate view id `{}`", entry.id);
                continue;
            }
            registry.index.insert(entry.id.clone(), registry.entries.len());
            registry.entries.push(entry);
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&ViewEntry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn first(&self) -> Option<&ViewEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
