//! Core functionality for the multi-view explorer
//!
//! This crate provides the state and event abstractions every other crate
//! builds on: typed event emitters, observable object states, the composite
//! state, the URL-fragment codec and the dataset contract.

pub mod config;
pub mod dataset;
pub mod element;
pub mod error;
pub mod events;
pub mod flash;
pub mod hash_url;
pub mod query;
pub mod state;

// Re-export commonly used types
pub use config::{ConfigError, NotificationSettings, Settings};
pub use dataset::{DatasetEvent, DatasetModel};
pub use element::Element;
pub use error::{Error, QueryError, Result};
pub use events::{EventEmitter, Subscription, ViewLifecycle};
pub use flash::{Category, Flash};
pub use hash_url::{FragmentParams, HashUrlCodec};
pub use query::{Filter, Query, SortOrder, SortSpec};
pub use state::{view_key, CompositeState, ObjectState, SetOptions, StateLayers};
