//! Sub-view abstraction - base trait for every view the explorer can switch to

use std::sync::Arc;

use mv_core::{Element, EventEmitter, Flash, ObjectState, ViewLifecycle};

/// A visualization participating in a multi-view session
///
/// Only the coordination surface is described here; how a view renders its
/// element is its own business.
pub trait SubView: Send + Sync {
    /// The element the shell attaches and navigation shows or hides
    fn element(&self) -> &Element;

    /// The view's own observable state, if it keeps one
    fn state(&self) -> Option<Arc<ObjectState>> {
        None
    }

    /// Flash messages the view wants shown to the user
    fn flash(&self) -> &EventEmitter<Flash>;

    /// Show / hide signals delivered by navigation
    fn lifecycle(&self) -> &EventEmitter<ViewLifecycle>;
}
