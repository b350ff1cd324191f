//! The multi-view coordinator
//!
//! Owns the composite state, the view registry, the shell, navigation and
//! the notification center, and wires the subscriptions between them and
//! the dataset.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use mv_core::hash_url::{GRAPH_KEY, QUERY_KEY};
use mv_core::state::into_object;
use mv_core::{
    CompositeState, DatasetEvent, DatasetModel, Element, Error, Flash, HashUrlCodec, QueryError, Result, Settings,
    StateLayers, Subscription,
};
use mv_ui::{MenuAction, NavigationController, NotificationCenter, NotificationId, Shell};
use mv_views::{default_views, ViewEntry, ViewRegistry};

use crate::bindings::StateBinding;

/// Construction input for a [`Coordinator`]
///
/// `model` and `element` are required. Everything else is optional.
#[derive(Default)]
pub struct CoordinatorOptions {
    model: Option<Arc<dyn DatasetModel>>,
    element: Option<Element>,
    views: Option<Vec<ViewEntry>>,
    state: Option<Value>,
    fragment: Option<String>,
    settings: Settings,
}

impl CoordinatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: Arc<dyn DatasetModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Views in display order; omitted or empty means the default views
    pub fn views(mut self, views: Vec<ViewEntry>) -> Self {
        self.views = Some(views);
        self
    }

    /// Caller overrides, the highest-precedence state layer
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// URL fragment to read `query` and `view-graph` from
    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

/// A running multi-view session
pub struct Coordinator {
    model: Arc<dyn DatasetModel>,
    state: Arc<CompositeState>,
    registry: Arc<ViewRegistry>,
    shell: Shell,
    navigation: Arc<NavigationController>,
    notifications: Arc<NotificationCenter>,
    settings: Settings,
    _subscriptions: Vec<Subscription>,
}

impl Coordinator {
    pub fn new(options: CoordinatorOptions) -> Result<Self> {
        let CoordinatorOptions {
            model,
            element,
            views,
            state: overrides,
            fragment,
            settings,
        } = options;

        let model = model.ok_or(Error::MissingCollaborator("model"))?;
        let element = element.ok_or(Error::MissingCollaborator("element"))?;

        let query_snapshot = model.query_state().to_json();
        let layers = StateLayers {
            defaults: StateLayers::defaults(query_snapshot.clone(), model.backend_type(), model.url()),
            url: fragment
                .map(|fragment| StateLayers::from_fragment(&HashUrlCodec::new(fragment).parse(), &query_snapshot))
                .unwrap_or_default(),
            initial: override_layer(overrides),
        };
        let state = Arc::new(CompositeState::from_layers(layers));

        let entries = match views {
            Some(views) if !views.is_empty() => views,
            _ => default_views(&state),
        };
        let registry = Arc::new(ViewRegistry::new(entries));
        let shell = Shell::render(element, &registry);
        let notifications = Arc::new(NotificationCenter::new(settings.notifications.clone()));

        let mut subscriptions: Vec<Subscription> = StateBinding::enumerate(model.as_ref(), &registry)
            .into_iter()
            .map(|binding| binding.install(&state))
            .collect();

        for entry in registry.iter() {
            let notifications = Arc::clone(&notifications);
            subscriptions.push(entry.view.flash().subscribe(move |flash: &Flash| {
                notifications.notify(flash.clone());
            }));
        }

        shell.set_read_only(state.is_read_only());

        let navigation = Arc::new(NavigationController::new(
            Arc::clone(&registry),
            shell.nav_links().clone(),
            Arc::clone(&state),
        ));

        subscriptions.push(bind_alerts(&notifications, &shell));
        subscriptions.push(bind_query_lifecycle(&model, &notifications, &shell, &settings));
        subscriptions.push(bind_state_followers(&state, &navigation, &shell));

        info!(
            views = registry.len(),
            backend = model.backend_type(),
            "Coordinator ready"
        );

        Ok(Self {
            model,
            state,
            registry,
            shell,
            navigation,
            notifications,
            settings,
            _subscriptions: subscriptions,
        })
    }

    /// Fetch the dataset, then run the composite query against it
    pub async fn load(&self) -> Result<(), QueryError> {
        if let Err(e) = self.model.fetch().await {
            let message = e.message_or(&self.settings.notifications.query_error_fallback);
            error!("Failed to fetch dataset: {}", message);
            self.notifications.notify(Flash::error(message));
            return Err(e);
        }

        let query = self.state.query();
        self.model.query(&query).await
    }

    pub fn model(&self) -> &Arc<dyn DatasetModel> {
        &self.model
    }

    pub fn state(&self) -> &Arc<CompositeState> {
        &self.state
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Serializable snapshot of the composite state
    pub fn to_json(&self) -> Value {
        self.state.to_json()
    }

    pub fn notify(&self, flash: Flash) -> NotificationId {
        self.notifications.notify(flash)
    }

    pub fn clear_notifications(&self) -> usize {
        self.notifications.clear_notifications()
    }

    /// Activate a view; unknown ids are logged and ignored
    pub fn switch_view(&self, id: &str) -> bool {
        match self.navigation.switch_to(id) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring view switch: {}", e);
                false
            }
        }
    }

    /// Open the filter editor or facet viewer; refused while read-only
    pub fn open_menu(&self, action: MenuAction) -> bool {
        if self.state.is_read_only() {
            debug!("Menu {:?} unavailable in read-only mode", action);
            return false;
        }
        self.shell.open_menu(action);
        true
    }

    /// Fragment carrying `query` and `view-graph`
    pub fn to_fragment(&self) -> String {
        let query = self.state.query().to_string();
        let graph = self
            .state
            .get(GRAPH_KEY)
            .unwrap_or_else(|| Value::Object(Map::new()))
            .to_string();
        HashUrlCodec::compose([(QUERY_KEY, query.as_str()), (GRAPH_KEY, graph.as_str())])
    }
}

fn override_layer(overrides: Option<Value>) -> Map<String, Value> {
    match overrides.map(into_object) {
        Some(Ok(overrides)) => overrides,
        Some(Err(e)) => {
            warn!("Ignoring state overrides: {}", e);
            Map::new()
        }
        None => Map::new(),
    }
}

/// The shell's alert list mirrors the notification queue
fn bind_alerts(notifications: &Arc<NotificationCenter>, shell: &Shell) -> Subscription {
    let center = Arc::downgrade(notifications);
    let shell = shell.clone();

    notifications.on_change(move || {
        if let Some(center) = center.upgrade() {
            shell.show_alerts(&center.current());
        }
    })
}

/// Loader while a query runs, result count on success, error on failure
fn bind_query_lifecycle(
    model: &Arc<dyn DatasetModel>,
    notifications: &Arc<NotificationCenter>,
    shell: &Shell,
    settings: &Settings,
) -> Subscription {
    let dataset = Arc::downgrade(model);
    let notifications = Arc::clone(notifications);
    let shell = shell.clone();
    let fallback = settings.notifications.query_error_fallback.clone();

    model.events().subscribe(move |event: &DatasetEvent| match event {
        DatasetEvent::QueryStart => {
            notifications.notify(Flash::loader());
        }
        DatasetEvent::QueryDone => {
            notifications.clear_notifications();
            shell.set_doc_count(dataset.upgrade().and_then(|dataset| dataset.doc_count()));
        }
        DatasetEvent::QueryFail(e) => {
            notifications.clear_notifications();
            let message = e.message_or(&fallback);
            warn!("Query failed: {}", message);
            notifications.notify(Flash::error(message));
        }
    })
}

/// Navigation and the read-only marker follow composite changes
fn bind_state_followers(state: &Arc<CompositeState>, navigation: &Arc<NavigationController>, shell: &Shell) -> Subscription {
    let composite = Arc::downgrade(state);
    let navigation = Arc::downgrade(navigation);
    let shell = shell.clone();

    state.on_change(move || {
        if let Some(navigation) = navigation.upgrade() {
            navigation.sync_from_state();
        }
        if let Some(state) = composite.upgrade() {
            shell.set_read_only(state.is_read_only());
        }
    })
}
