//! Multi-view explorer: the coordinator tying dataset, views, navigation
//! and notifications together

mod bindings;
mod coordinator;
mod restore;

pub use coordinator::{Coordinator, CoordinatorOptions};
pub use restore::{RestoreError, RestoreFactory};
