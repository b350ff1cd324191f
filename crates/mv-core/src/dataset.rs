//! Contract of the dataset collaborator
//!
//! The coordinator never executes queries. It calls `fetch` and `query`,
//! listens to the lifecycle events the model emits, and mirrors the model's
//! query state into the composite state.

use std::sync::Arc;

use serde_json::Value;

use crate::error::QueryError;
use crate::events::EventEmitter;
use crate::state::ObjectState;

/// Query lifecycle events emitted by a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetEvent {
    QueryStart,
    QueryDone,
    QueryFail(QueryError),
}

/// A dataset backing a coordinator
#[async_trait::async_trait]
pub trait DatasetModel: Send + Sync {
    /// Load basic information (fields, records) from the backend
    async fn fetch(&self) -> Result<(), QueryError>;

    /// Run a query. Implementations emit `QueryStart` first and then exactly
    /// one of `QueryDone` / `QueryFail`.
    async fn query(&self, query: &Value) -> Result<(), QueryError>;

    /// Lifecycle event source
    fn events(&self) -> &EventEmitter<DatasetEvent>;

    /// The shared, observable query state
    fn query_state(&self) -> Arc<ObjectState>;

    /// Number of records matched by the most recent settled query
    fn doc_count(&self) -> Option<u64>;

    /// Backend identifier, used by restore
    fn backend_type(&self) -> &str;

    /// Source location, if the backend has one
    fn url(&self) -> Option<&str>;
}
