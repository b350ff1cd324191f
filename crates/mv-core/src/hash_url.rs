//! URL-fragment codec
//!
//! The page fragment carries state as a query string, for example
//! `#explorer?query=%7B%22q%22%3A%22x%22%7D&view-graph=%7B%7D`. Values are
//! percent-decoded but never JSON-decoded implicitly; callers pick the keys
//! that hold JSON.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Fragment key holding the JSON-encoded query state
pub const QUERY_KEY: &str = "query";
/// Older name of [`QUERY_KEY`]
pub const LEGACY_QUERY_KEY: &str = "reclineQuery";
/// Fragment key holding the JSON-encoded graph view state
pub const GRAPH_KEY: &str = "view-graph";
/// Older name of [`GRAPH_KEY`]
pub const LEGACY_GRAPH_KEY: &str = "graph";

/// Reads and writes the page's URL fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashUrlCodec {
    fragment: String,
}

impl HashUrlCodec {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Parse the fragment into a flat key to decoded-string map
    pub fn parse(&self) -> FragmentParams {
        let fragment = self.fragment.strip_prefix('#').unwrap_or(&self.fragment);
        let query = match fragment.split_once('?') {
            Some((_path, query)) => query,
            None => fragment,
        };

        let mut params = IndexMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            params.insert(key.into_owned(), value.into_owned());
        }

        debug!(keys = params.len(), "Parsed URL fragment");
        FragmentParams { params }
    }

    /// Build a fragment query string from key/value pairs
    pub fn compose<'a, I>(pairs: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Result of [`HashUrlCodec::parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentParams {
    params: IndexMap<String, String>,
}

impl FragmentParams {
    /// Raw decoded value. Empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// JSON-decode the value under `key`, if present
    pub fn decode_json(&self, key: &str) -> Result<Option<Value>> {
        match self.get(key) {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|source| Error::Parse {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// JSON-decode `key`, consulting `legacy_key` only when `key` is absent
    pub fn decode_json_with_legacy(&self, key: &str, legacy_key: &str) -> Result<Option<Value>> {
        if self.get(key).is_some() {
            self.decode_json(key)
        } else {
            self.decode_json(legacy_key)
        }
    }
}
