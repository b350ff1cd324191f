//! Flash messages raised by sub-views and the coordinator

use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Warning,
    Success,
    Error,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Warning => "warning",
            Category::Success => "success",
            Category::Error => "error",
        }
    }
}

/// Request for a notification; unset fields take the notification defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flash {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<bool>,
}

impl Flash {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Persistent error message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            category: Some(Category::Error),
            persist: Some(true),
            loader: None,
        }
    }

    /// Persistent loading indicator
    pub fn loader() -> Self {
        Self {
            loader: Some(true),
            persist: Some(true),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persist = Some(true);
        self
    }
}
