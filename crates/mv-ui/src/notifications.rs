//! Transient and persistent user notifications
//!
//! Nothing expires in the background. Expiry is evaluated against the clock
//! when [`NotificationCenter::expire`] is ticked or notifications are read
//! through [`NotificationCenter::displayed`]; whichever removes entries
//! emits the change event, so `on_change` subscribers only learn about an
//! elapsed window once someone ticks or reads. Removal is idempotent.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use mv_core::{Category, EventEmitter, Flash, NotificationSettings, Subscription};

/// Unique identifier for a notification
pub type NotificationId = Uuid;

/// A displayed notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub category: Category,
    pub persist: bool,
    pub loader: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether the display window applies to this notification
    pub fn auto_expires(&self) -> bool {
        !self.persist && !self.loader
    }
}

/// Queue of notifications shown to the user
pub struct NotificationCenter {
    settings: NotificationSettings,
    entries: RwLock<Vec<Notification>>,
    changed: EventEmitter<()>,
}

impl NotificationCenter {
    pub fn new(settings: NotificationSettings) -> Self {
        Self {
            settings,
            entries: RwLock::new(Vec::new()),
            changed: EventEmitter::new(),
        }
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// Display a notification built from `flash` over the defaults
    pub fn notify(&self, flash: Flash) -> NotificationId {
        self.notify_at(flash, Utc::now())
    }

    /// [`NotificationCenter::notify`] with an explicit creation time
    pub fn notify_at(&self, flash: Flash, now: DateTime<Utc>) -> NotificationId {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: flash
                .message
                .unwrap_or_else(|| self.settings.default_message.clone()),
            category: flash.category.unwrap_or_default(),
            persist: flash.persist.unwrap_or(false),
            loader: flash.loader.unwrap_or(false),
            created_at: now,
        };
        let id = notification.id;

        debug!(
            category = notification.category.as_str(),
            persist = notification.persist,
            loader = notification.loader,
            "Notify: {}",
            notification.message
        );
        self.entries.write().push(notification);
        self.changed.emit(&());
        id
    }

    /// Remove every displayed notification
    pub fn clear_notifications(&self) -> usize {
        let removed = {
            let mut entries = self.entries.write();
            let removed = entries.len();
            entries.clear();
            removed
        };
        if removed > 0 {
            self.changed.emit(&());
        }
        removed
    }

    /// Remove one notification; returns false if it was already gone
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|n| n.id != id);
            entries.len() != before
        };
        if removed {
            self.changed.emit(&());
        }
        removed
    }

    /// Drop notifications whose display window has elapsed at `now`
    pub fn expire(&self, now: DateTime<Utc>) -> usize {
        let window = Duration::from_std(self.settings.display_window).unwrap_or(Duration::MAX);
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|n| !n.auto_expires() || now.signed_duration_since(n.created_at) < window);
            before - entries.len()
        };
        if removed > 0 {
            debug!(removed, "Expired notifications");
            self.changed.emit(&());
        }
        removed
    }

    /// Notifications displayed now
    pub fn displayed(&self) -> Vec<Notification> {
        self.displayed_at(Utc::now())
    }

    /// Notifications displayed at `now`
    pub fn displayed_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        self.expire(now);
        self.entries.read().clone()
    }

    /// Entries as stored, without evaluating expiry
    pub fn current(&self) -> Vec<Notification> {
        self.entries.read().clone()
    }

    /// Subscribe to additions and removals
    pub fn on_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.changed.subscribe(move |_| handler())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NotificationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn window() -> Duration {
        Duration::from_std(NotificationSettings::default().display_window).unwrap()
    }

    #[test]
    fn test_defaults_apply() {
        let center = NotificationCenter::default();
        let now = Utc::now();
        center.notify_at(Flash::default(), now);

        let shown = center.displayed_at(now);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, "Loading");
        assert_eq!(shown[0].category, Category::Warning);
        assert!(!shown[0].persist);
        assert!(!shown[0].loader);
    }

    #[test]
    fn test_clear_removes_persistent_notifications() {
        let center = NotificationCenter::default();
        center.notify(Flash::message("x").persistent());
        center.notify(Flash::loader());

        assert_eq!(center.clear_notifications(), 2);
        assert!(center.displayed().is_empty());
        assert_eq!(center.clear_notifications(), 0);
    }

    #[test]
    fn test_transient_notification_expires_without_clear() {
        let center = NotificationCenter::default();
        let now = Utc::now();
        center.notify_at(Flash::message("y"), now);

        assert_eq!(center.displayed_at(now + window() - Duration::milliseconds(1)).len(), 1);
        assert!(center.displayed_at(now + window()).is_empty());
    }

    #[test]
    fn test_persistent_and_loader_survive_window() {
        let center = NotificationCenter::default();
        let now = Utc::now();
        center.notify_at(Flash::error("boom"), now);
        center.notify_at(Flash { loader: Some(true), ..Flash::default() }, now);
        center.notify_at(Flash::message("gone soon"), now);

        let later = center.displayed_at(now + window() * 10);
        assert_eq!(later.len(), 2);
        assert_eq!(later[0].category, Category::Error);
        assert!(later[1].loader);
    }

    #[test]
    fn test_notifications_stack_and_dismiss_is_idempotent() {
        let center = NotificationCenter::default();
        let first = center.notify(Flash::message("one").persistent());
        center.notify(Flash::message("two").persistent());

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        let shown = center.displayed();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, "two");
    }

    #[test]
    fn test_expire_after_clear_is_noop() {
        let center = NotificationCenter::default();
        let now = Utc::now();
        center.notify_at(Flash::message("z"), now);
        center.clear_notifications();
        assert_eq!(center.expire(now + window()), 0);
    }

    #[test]
    fn test_expiry_is_announced_to_subscribers() {
        let center = NotificationCenter::default();
        let now = Utc::now();
        center.notify_at(Flash::message("tick"), now);

        let changes = Arc::new(RwLock::new(0));
        let counter = Arc::clone(&changes);
        let _sub = center.on_change(move || *counter.write() += 1);

        assert_eq!(center.current().len(), 1);
        assert_eq!(center.expire(now + window()), 1);
        assert_eq!(*changes.read(), 1);
        assert!(center.current().is_empty());
    }
}
