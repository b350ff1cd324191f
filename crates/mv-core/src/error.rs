//! Error types shared across the workspace

use serde_json::Value;
use thiserror::Error;

/// Errors raised by the coordination core
///
/// Only [`Error::MissingCollaborator`] is fatal, and only during coordinator
/// construction. Every other variant leaves its component usable.
#[derive(Error, Debug)]
pub enum Error {
    /// A URL-fragment value that must hold JSON could not be decoded
    #[error("malformed JSON in fragment key `{key}`: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The dataset rejected a fetch or query
    #[error("query failed: {0}")]
    Query(QueryError),

    /// Navigation was requested to an id that is not registered
    #[error("no view registered with id `{0}`")]
    Navigation(String),

    /// A required construction input was not supplied
    #[error("missing required collaborator `{0}`")]
    MissingCollaborator(&'static str),

    /// A state partial was not a JSON object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}

impl From<QueryError> for Error {
    fn from(error: QueryError) -> Self {
        Error::Query(error)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure value reported by a dataset backend
///
/// Backends may fail with plain text, with a structured `{title, message}`
/// object, or with anything else. [`QueryError::message`] turns any of
/// these into something presentable.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError(pub Value);

impl QueryError {
    pub fn text(message: impl Into<String>) -> Self {
        Self(Value::String(message.into()))
    }

    pub fn structured(title: Option<&str>, message: Option<&str>) -> Self {
        let mut object = serde_json::Map::new();
        if let Some(title) = title {
            object.insert("title".into(), Value::String(title.into()));
        }
        if let Some(message) = message {
            object.insert("message".into(), Value::String(message.into()));
        }
        Self(Value::Object(object))
    }

    /// The raw failure value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Message for display, or `None` when nothing usable can be derived
    pub fn message(&self) -> Option<String> {
        let message = match &self.0 {
            Value::String(text) => text.clone(),
            Value::Object(object) => {
                let mut message = String::new();
                if let Some(title) = object.get("title").and_then(display_field) {
                    message.push_str(&title);
                    message.push_str(": ");
                }
                if let Some(detail) = object.get("message").and_then(display_field) {
                    message.push_str(&detail);
                }
                message
            }
            _ => return None,
        };

        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }

    /// Message for display, falling back to `fallback`
    pub fn message_or(&self, fallback: &str) -> String {
        self.message().unwrap_or_else(|| fallback.to_string())
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => f.write_str(&message),
            None => write!(f, "{}", self.0),
        }
    }
}

impl std::error::Error for QueryError {}

fn display_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
