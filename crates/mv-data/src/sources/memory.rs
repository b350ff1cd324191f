//! In-memory dataset
//!
//! Holds its records in memory, either supplied inline or loaded from a CSV
//! file on `fetch`. Queries run synchronously, so lifecycle events are
//! emitted before `query` returns. Non-silent changes to the query state
//! trigger a fresh query with the new state.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use mv_core::query::new_query_state;
use mv_core::{DatasetEvent, DatasetModel, EventEmitter, ObjectState, Query, QueryError, SetOptions, Subscription};

use crate::engine::{execute, Record};
use crate::sources::csv_source::read_csv_records;

/// Where records come from on `fetch`
#[derive(Debug, Clone)]
enum RecordSource {
    Inline,
    Csv(PathBuf),
}

/// Dataset held entirely in memory
pub struct MemoryDataset {
    backend: String,
    url: Option<String>,
    source: RecordSource,
    fields: RwLock<Vec<String>>,
    records: RwLock<Vec<Record>>,
    hits: RwLock<Vec<Record>>,
    doc_count: RwLock<Option<u64>>,
    query_state: Arc<ObjectState>,
    events: EventEmitter<DatasetEvent>,
    _requery: Subscription,
}

impl MemoryDataset {
    pub const BACKEND: &'static str = "memory";
    pub const CSV_BACKEND: &'static str = "csv";

    /// Dataset over inline records
    pub fn new(records: Vec<Record>) -> Arc<Self> {
        let fields = collect_fields(&records);
        Self::build(Self::BACKEND, None, RecordSource::Inline, fields, records)
    }

    /// Dataset loading `path` on fetch
    pub fn from_csv(path: impl Into<PathBuf>) -> Arc<Self> {
        let path = path.into();
        let url = path.display().to_string();
        Self::build(Self::CSV_BACKEND, Some(url), RecordSource::Csv(path), Vec::new(), Vec::new())
    }

    fn build(
        backend: &str,
        url: Option<String>,
        source: RecordSource,
        fields: Vec<String>,
        records: Vec<Record>,
    ) -> Arc<Self> {
        let query_state = Arc::new(new_query_state());

        Arc::new_cyclic(|weak: &Weak<Self>| {
            let dataset = weak.clone();
            let requery = query_state.on_change(move || {
                if let Some(dataset) = dataset.upgrade() {
                    dataset.requery();
                }
            });

            Self {
                backend: backend.to_string(),
                url,
                source,
                fields: RwLock::new(fields),
                records: RwLock::new(records),
                hits: RwLock::new(Vec::new()),
                doc_count: RwLock::new(None),
                query_state,
                events: EventEmitter::new(),
                _requery: requery,
            }
        })
    }

    pub fn fields(&self) -> Vec<String> {
        self.fields.read().clone()
    }

    /// Records matched by the last settled query, current page only
    pub fn hits(&self) -> Vec<Record> {
        self.hits.read().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// Run `query` to completion, emitting lifecycle events
    pub fn run_query(&self, query: &Value) -> Result<(), QueryError> {
        self.events.emit(&DatasetEvent::QueryStart);

        let parsed = match Query::from_json(query) {
            Ok(parsed) => parsed,
            Err(e) => {
                let error = QueryError::structured(Some("Invalid query"), Some(&e.to_string()));
                warn!("Rejected query: {}", error);
                self.events.emit(&DatasetEvent::QueryFail(error.clone()));
                return Err(error);
            }
        };

        if let Value::Object(attributes) = query {
            self.query_state.set(attributes.clone(), SetOptions::silent());
        }

        let outcome = {
            let records = self.records.read();
            execute(&records, &parsed)
        };
        debug!(total = outcome.total, page = outcome.hits.len(), "Query settled");

        *self.doc_count.write() = Some(outcome.total as u64);
        *self.hits.write() = outcome.hits;

        self.events.emit(&DatasetEvent::QueryDone);
        Ok(())
    }

    fn requery(&self) {
        let snapshot = self.query_state.to_json();
        if let Err(e) = self.run_query(&snapshot) {
            debug!("Re-query after state change failed: {}", e);
        }
    }
}

#[async_trait]
impl DatasetModel for MemoryDataset {
    async fn fetch(&self) -> Result<(), QueryError> {
        match &self.source {
            RecordSource::Inline => Ok(()),
            RecordSource::Csv(path) => {
                let (fields, records) = read_csv_records(path).await?;
                info!("Fetched {} records from {}", records.len(), path.display());
                *self.fields.write() = fields;
                *self.records.write() = records;
                Ok(())
            }
        }
    }

    async fn query(&self, query: &Value) -> Result<(), QueryError> {
        self.run_query(query)
    }

    fn events(&self) -> &EventEmitter<DatasetEvent> {
        &self.events
    }

    fn query_state(&self) -> Arc<ObjectState> {
        Arc::clone(&self.query_state)
    }

    fn doc_count(&self) -> Option<u64> {
        *self.doc_count.read()
    }

    fn backend_type(&self) -> &str {
        &self.backend
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

fn collect_fields(records: &[Record]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !fields.contains(key) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> Vec<Record> {
        [json!({"name": "ada", "age": 36}), json!({"name": "grace", "age": 45}), json!({"name": "alan", "age": 41})]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect()
    }

    fn recorded(dataset: &MemoryDataset) -> (Arc<RwLock<Vec<DatasetEvent>>>, Subscription) {
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = dataset.events().subscribe(move |event| sink.write().push(event.clone()));
        (seen, sub)
    }

    #[tokio::test]
    async fn test_query_emits_start_then_done() {
        let dataset = MemoryDataset::new(people());
        let (seen, _sub) = recorded(&dataset);

        dataset.query(&json!({"q": "a", "size": 2})).await.unwrap();

        assert_eq!(*seen.read(), vec![DatasetEvent::QueryStart, DatasetEvent::QueryDone]);
        assert_eq!(dataset.doc_count(), Some(3));
        assert_eq!(dataset.hits().len(), 2);
        assert_eq!(dataset.query_state().get("size"), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_invalid_query_emits_fail() {
        let dataset = MemoryDataset::new(people());
        let (seen, _sub) = recorded(&dataset);

        let err = dataset.query(&json!({"size": "lots"})).await.unwrap_err();

        assert!(err.message().unwrap().starts_with("Invalid query: "));
        assert_eq!(seen.read().len(), 2);
        assert!(matches!(seen.read()[1], DatasetEvent::QueryFail(_)));
        assert_eq!(dataset.doc_count(), None);
    }

    #[test]
    fn test_query_state_change_triggers_requery() {
        let dataset = MemoryDataset::new(people());
        let (seen, _sub) = recorded(&dataset);

        dataset.query_state().set_key("q", json!("grace"));

        assert_eq!(*seen.read(), vec![DatasetEvent::QueryStart, DatasetEvent::QueryDone]);
        assert_eq!(dataset.doc_count(), Some(1));
    }

    #[tokio::test]
    async fn test_csv_fetch_loads_records() {
        let path = std::env::temp_dir().join(format!("mv-data-memory-{}.csv", std::process::id()));
        std::fs::write(&path, "city,country\nParis,FR\nBerlin,DE\n").unwrap();

        let dataset = MemoryDataset::from_csv(&path);
        dataset.fetch().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(dataset.backend_type(), "csv");
        assert_eq!(dataset.fields(), vec!["city", "country"]);
        assert_eq!(dataset.record_count(), 2);
    }

    #[tokio::test]
    async fn test_csv_fetch_failure_is_query_error() {
        let dataset = MemoryDataset::from_csv("/definitely/not/here.csv");
        let err = dataset.fetch().await.unwrap_err();
        assert!(err.message().unwrap().starts_with("Data error: "));
    }
}
