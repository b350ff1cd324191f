//! Shared query state
//!
//! The query state is an [`ObjectState`] owned by the dataset. Its JSON form
//! is what lands in the composite `query` slice and in the URL fragment;
//! [`Query`] is the typed view of the same document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::ObjectState;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Typed form of the query state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    /// Free-text search
    pub q: String,
    /// Offset of the first result
    pub from: usize,
    /// Page size
    pub size: usize,
    pub filters: Vec<Filter>,
    pub sort: Vec<SortSpec>,
    pub facets: Map<String, Value>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            q: String::new(),
            from: 0,
            size: DEFAULT_PAGE_SIZE,
            filters: Vec::new(),
            sort: Vec::new(),
            facets: Map::new(),
        }
    }
}

impl Query {
    /// Read a query document, tolerating missing fields
    pub fn from_json(value: &Value) -> serde_json::Result<Self> {
        Query::deserialize(value)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Record filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals a value
    Term { field: String, term: Value },
    /// Field lies within `[start, stop]`; either bound may be open
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stop: Option<Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// Fresh query state holding the default query
pub fn new_query_state() -> ObjectState {
    match Query::default().to_json() {
        Value::Object(attributes) => ObjectState::new(attributes),
        _ => ObjectState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_query_document() {
        let state = new_query_state();
        assert_eq!(
            state.to_json(),
            json!({"q": "", "from": 0, "size": 100, "filters": [], "sort": [], "facets": {}})
        );
    }

    #[test]
    fn test_partial_documents_fill_defaults() {
        let query = Query::from_json(&json!({
            "q": "paris",
            "filters": [
                {"type": "term", "field": "country", "term": "FR"},
                {"type": "range", "field": "year", "start": 1990}
            ],
            "sort": [{"field": "year", "order": "desc"}]
        }))
        .unwrap();

        assert_eq!(query.q, "paris");
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(
            query.filters[1],
            Filter::Range { field: "year".into(), start: Some(json!(1990)), stop: None }
        );
        assert_eq!(query.sort[0].order, SortOrder::Desc);
    }
}
