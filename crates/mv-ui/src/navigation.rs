//! Single-active-view navigation
//!
//! Exactly one registered view is visible at a time once navigation is
//! created. Switching hides every other view element, signals the previous
//! view with [`ViewLifecycle::Hide`] and the new one with
//! [`ViewLifecycle::Show`], marks the matching navigation link and records
//! the id under `currentView` in the composite state.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use mv_core::{CompositeState, Element, Error, EventEmitter, Result, Subscription, ViewLifecycle};
use mv_views::ViewRegistry;

pub const ACTIVE_CLASS: &str = "active";
pub const DISABLED_CLASS: &str = "disabled";

/// Entry of the view switcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub active: bool,
}

/// Emitted after the active view changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationChange {
    pub from: Option<String>,
    pub to: String,
}

/// State machine over the registered views
pub struct NavigationController {
    registry: Arc<ViewRegistry>,
    links: IndexMap<String, Element>,
    state: Arc<CompositeState>,
    active: RwLock<Option<String>>,
    changed: EventEmitter<NavigationChange>,
}

impl NavigationController {
    /// Create the controller and activate the initial view.
    ///
    /// The initial view is `currentView` when it names a registered view,
    /// otherwise the first registered one. Activation here does not write
    /// `currentView` back.
    pub fn new(registry: Arc<ViewRegistry>, links: IndexMap<String, Element>, state: Arc<CompositeState>) -> Self {
        let controller = Self {
            registry,
            links,
            state,
            active: RwLock::new(None),
            changed: EventEmitter::new(),
        };

        match controller.initial_view() {
            Some(id) => {
                info!("Initial view: {}", id);
                controller.activate(&id);
            }
            None => debug!("No views registered, navigation idle"),
        }
        controller
    }

    fn initial_view(&self) -> Option<String> {
        self.state
            .current_view()
            .filter(|id| self.registry.contains(id))
            .or_else(|| self.registry.first().map(|entry| entry.id.clone()))
    }

    /// Id of the visible view
    pub fn active_view(&self) -> Option<String> {
        self.active.read().clone()
    }

    /// Make `id` the visible view and record it as `currentView`
    pub fn switch_to(&self, id: &str) -> Result<()> {
        if !self.registry.contains(id) {
            return Err(Error::Navigation(id.to_string()));
        }

        if self.active_view().as_deref() != Some(id) {
            self.activate(id);
        }
        if self.state.current_view().as_deref() != Some(id) {
            self.state.set_current_view(id);
        }
        Ok(())
    }

    /// Follow a `currentView` written by someone else.
    ///
    /// Returns true if the active view changed. Unknown ids are ignored.
    pub fn sync_from_state(&self) -> bool {
        let Some(id) = self.state.current_view() else {
            return false;
        };
        if !self.registry.contains(&id) || self.active_view().as_deref() == Some(id.as_str()) {
            return false;
        }
        self.activate(&id);
        true
    }

    fn activate(&self, id: &str) {
        let previous = self.active.write().replace(id.to_string());
        debug!("Activating view {} (was {:?})", id, previous);

        for entry in self.registry.iter().filter(|entry| entry.id != id) {
            entry.view.element().hide();
            // On the very first activation every other view is told it is hidden
            if previous.is_none() || previous.as_deref() == Some(entry.id.as_str()) {
                entry.view.lifecycle().emit(&ViewLifecycle::Hide);
            }
        }

        if let Some(target) = self.registry.get(id) {
            target.view.element().show();
            target.view.lifecycle().emit(&ViewLifecycle::Show);
        }

        for (link_id, link) in &self.links {
            if link_id == id {
                link.add_class(ACTIVE_CLASS);
                link.add_class(DISABLED_CLASS);
            } else {
                link.remove_class(ACTIVE_CLASS);
                link.remove_class(DISABLED_CLASS);
            }
        }

        self.changed.emit(&NavigationChange {
            from: previous,
            to: id.to_string(),
        });
    }

    /// Switcher entries in display order
    pub fn nav_items(&self) -> Vec<NavItem> {
        let active = self.active_view();
        self.registry
            .iter()
            .map(|entry| NavItem {
                id: entry.id.clone(),
                label: entry.label.clone(),
                active: active.as_deref() == Some(entry.id.as_str()),
            })
            .collect()
    }

    pub fn on_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&NavigationChange) + Send + Sync + 'static,
    {
        self.changed.subscribe(handler)
    }
}
