//! User-facing components of the multi-view explorer
//!
//! This crate provides the shell element tree, view navigation and
//! the notification queue.

pub mod navigation;
pub mod notifications;
pub mod shell;

pub use navigation::{NavItem, NavigationChange, NavigationController};
pub use notifications::{Notification, NotificationCenter, NotificationId};
pub use shell::{MenuAction, Shell};
