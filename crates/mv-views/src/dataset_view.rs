//! Built-in views used when the caller does not supply any

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use mv_core::{view_key, CompositeState, Element, EventEmitter, Flash, ObjectState, ViewLifecycle};

use crate::{SubView, ViewEntry};

/// Kinds of built-in views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Grid,
    Graph,
    Map,
    Timeline,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [ViewKind::Grid, ViewKind::Graph, ViewKind::Map, ViewKind::Timeline];

    /// Registry id (also the routing id in the fragment)
    pub fn id(&self) -> &'static str {
        match self {
            ViewKind::Grid => "grid",
            ViewKind::Graph => "graph",
            ViewKind::Map => "map",
            ViewKind::Timeline => "timeline",
        }
    }

    /// Label for the view switcher
    pub fn label(&self) -> &'static str {
        match self {
            ViewKind::Grid => "Grid",
            ViewKind::Graph => "Graph",
            ViewKind::Map => "Map",
            ViewKind::Timeline => "Timeline",
        }
    }

    /// State a fresh view of this kind starts from
    pub fn default_state(&self) -> Value {
        match self {
            ViewKind::Grid => json!({"hiddenFields": [], "columnsWidth": [], "fitColumns": false}),
            ViewKind::Graph => json!({"group": null, "series": [], "graphType": "lines-and-points"}),
            ViewKind::Map => json!({
                "geomField": null,
                "lonField": null,
                "latField": null,
                "autoZoom": true,
                "cluster": false
            }),
            ViewKind::Timeline => json!({"startField": null, "endField": null}),
        }
    }
}

/// A headless built-in view: an element, an own state and the two event sources
pub struct DatasetView {
    kind: ViewKind,
    element: Element,
    state: Arc<ObjectState>,
    flash: EventEmitter<Flash>,
    lifecycle: EventEmitter<ViewLifecycle>,
}

impl DatasetView {
    /// Create a view whose state is `initial` merged over the kind's defaults
    pub fn new(kind: ViewKind, initial: Option<Value>) -> Self {
        let mut attributes = match kind.default_state() {
            Value::Object(defaults) => defaults,
            _ => Map::new(),
        };

        match initial {
            Some(Value::Object(initial)) => attributes.extend(initial),
            Some(Value::Null) | None => {}
            Some(other) => warn!("Ignoring non-object state for {} view: {}", kind.id(), other),
        }

        Self {
            kind,
            element: Element::new(kind.id()),
            state: Arc::new(ObjectState::new(attributes)),
            flash: EventEmitter::new(),
            lifecycle: EventEmitter::new(),
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Raise a flash message
    pub fn notify(&self, flash: Flash) {
        debug!("{} view raised a flash", self.kind.id());
        self.flash.emit(&flash);
    }
}

impl SubView for DatasetView {
    fn element(&self) -> &Element {
        &self.element
    }

    fn state(&self) -> Option<Arc<ObjectState>> {
        Some(Arc::clone(&self.state))
    }

    fn flash(&self) -> &EventEmitter<Flash> {
        &self.flash
    }

    fn lifecycle(&self) -> &EventEmitter<ViewLifecycle> {
        &self.lifecycle
    }
}

/// Grid, graph, map and timeline views seeded from their composite slices
pub fn default_views(state: &CompositeState) -> Vec<ViewEntry> {
    ViewKind::ALL
        .iter()
        .map(|kind| {
            let initial = state.get(&view_key(kind.id()));
            let view: Arc<dyn SubView> = Arc::new(DatasetView::new(*kind, initial));
            ViewEntry::new(kind.id(), kind.label(), view)
        })
        .collect()
}
