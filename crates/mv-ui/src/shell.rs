//! Element tree hosting the views
//!
//! ```text
//! root (.multiview)
//! ├── alert-messages      one alert per displayed notification
//! ├── header
//! │   ├── navigation        nav-<id> per view
//! │   ├── results-info      doc-count
//! │   └── menu              filter-editor, facet-viewer (hidden until opened)
//! └── data-view-container   one element per view
//! ```

use indexmap::IndexMap;
use tracing::debug;

use mv_core::Element;
use mv_views::ViewRegistry;

use crate::notifications::Notification;

pub const ROOT_CLASS: &str = "multiview";
pub const READ_ONLY_CLASS: &str = "read-only";
pub const LOADER_CLASS: &str = "loader";
const UNKNOWN_COUNT: &str = "Unknown";

/// Side panels reachable from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Filters,
    Facets,
}

impl MenuAction {
    fn element_name(&self) -> &'static str {
        match self {
            MenuAction::Filters => "filter-editor",
            MenuAction::Facets => "facet-viewer",
        }
    }
}

/// Rendered shell
#[derive(Debug, Clone)]
pub struct Shell {
    root: Element,
    alerts: Element,
    container: Element,
    doc_count: Element,
    filter_editor: Element,
    facet_viewer: Element,
    nav_links: IndexMap<String, Element>,
}

impl Shell {
    /// Render the shell into `root`, replacing its children
    pub fn render(root: Element, registry: &ViewRegistry) -> Self {
        root.clear();
        root.add_class(ROOT_CLASS);

        let alerts = Element::new("alert-messages");
        let header = Element::new("header");
        let navigation = Element::new("navigation");
        let results = Element::new("results-info");
        let doc_count = Element::new("doc-count");
        let menu = Element::new("menu");
        let filter_editor = Element::new(MenuAction::Filters.element_name());
        let facet_viewer = Element::new(MenuAction::Facets.element_name());
        let container = Element::new("data-view-container");

        let mut nav_links = IndexMap::new();
        for entry in registry.iter() {
            let link = Element::new(format!("nav-{}", entry.id));
            link.set_text(entry.label.clone());
            navigation.append(&link);
            nav_links.insert(entry.id.clone(), link);

            container.append(entry.view.element());
        }

        filter_editor.hide();
        facet_viewer.hide();
        menu.append(&filter_editor);
        menu.append(&facet_viewer);
        results.append(&doc_count);
        header.append(&navigation);
        header.append(&results);
        header.append(&menu);
        root.append(&alerts);
        root.append(&header);
        root.append(&container);

        debug!("Rendered shell with {} views", nav_links.len());

        let shell = Self {
            root,
            alerts,
            container,
            doc_count,
            filter_editor,
            facet_viewer,
            nav_links,
        };
        shell.set_doc_count(None);
        shell
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn alerts(&self) -> &Element {
        &self.alerts
    }

    /// Replace the alert list with one element per notification
    pub fn show_alerts(&self, notifications: &[Notification]) {
        self.alerts.clear();
        for notification in notifications {
            let alert = Element::new("alert");
            alert.add_class(&format!("alert-{}", notification.category.as_str()));
            if notification.loader {
                alert.add_class(LOADER_CLASS);
            }
            alert.set_text(notification.message.clone());
            self.alerts.append(&alert);
        }
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    /// Navigation links keyed by view id
    pub fn nav_links(&self) -> &IndexMap<String, Element> {
        &self.nav_links
    }

    pub fn set_doc_count(&self, count: Option<u64>) {
        let text = count.map_or_else(|| UNKNOWN_COUNT.to_string(), |count| count.to_string());
        self.doc_count.set_text(text);
    }

    pub fn doc_count_text(&self) -> Option<String> {
        self.doc_count.text()
    }

    pub fn set_read_only(&self, read_only: bool) {
        if read_only {
            self.root.add_class(READ_ONLY_CLASS);
        } else {
            self.root.remove_class(READ_ONLY_CLASS);
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.root.has_class(READ_ONLY_CLASS)
    }

    /// Reveal the panel for `action`
    pub fn open_menu(&self, action: MenuAction) {
        debug!("Opening {}", action.element_name());
        self.panel(action).show();
    }

    pub fn is_menu_open(&self, action: MenuAction) -> bool {
        self.panel(action).is_visible()
    }

    fn panel(&self, action: MenuAction) -> &Element {
        match action {
            MenuAction::Filters => &self.filter_editor,
            MenuAction::Facets => &self.facet_viewer,
        }
    }
}
