//! Attachable UI surfaces
//!
//! An [`Element`] is a cheap, clonable handle to a node of the shell: it can
//! be shown or hidden, carries CSS-like classes and optional text, and can
//! have children attached. Rendering is left to whoever walks the tree.

use std::collections::BTreeSet;
use std::sync::Arc;
use parking_lot::RwLock;

#[derive(Debug)]
struct ElementInner {
    name: String,
    visible: bool,
    classes: BTreeSet<String>,
    text: Option<String>,
    children: Vec<Element>,
}

/// Shared handle to a UI node
#[derive(Debug, Clone)]
pub struct Element {
    inner: Arc<RwLock<ElementInner>>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ElementInner {
                name: name.into(),
                visible: true,
                classes: BTreeSet::new(),
                text: None,
                children: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    pub fn show(&self) {
        self.inner.write().visible = true;
    }

    pub fn hide(&self) {
        self.inner.write().visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.inner.read().visible
    }

    pub fn add_class(&self, class: &str) {
        self.inner.write().classes.insert(class.to_string());
    }

    pub fn remove_class(&self, class: &str) {
        self.inner.write().classes.remove(class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.read().classes.contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.read().classes.iter().cloned().collect()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.write().text = Some(text.into());
    }

    pub fn text(&self) -> Option<String> {
        self.inner.read().text.clone()
    }

    /// Attach `child` as the last child
    pub fn append(&self, child: &Element) {
        self.inner.write().children.push(child.clone());
    }

    /// Drop every child
    pub fn clear(&self) {
        self.inner.write().children.clear();
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.read().children.clone()
    }

    /// First descendant (depth-first) named `name`
    pub fn find(&self, name: &str) -> Option<Element> {
        for child in self.children() {
            if child.name() == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Whether both handles point at the same node
    pub fn same_as(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
