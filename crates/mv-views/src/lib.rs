//! View system for the multi-view explorer

mod dataset_view;
mod registry;
mod sub_view;

pub use dataset_view::{default_views, DatasetView, ViewKind};
pub use registry::{ViewEntry, ViewRegistry};
pub use sub_view::SubView;
