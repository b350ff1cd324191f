//! Runtime settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`NotificationSettings::display_window`]
pub const NOTIFY_WINDOW_ENV: &str = "MULTIVIEW_NOTIFY_WINDOW";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid duration `{value}` in {origin}: {source}")]
    Duration {
        value: String,
        origin: String,
        #[source]
        source: humantime::DurationError,
    },
}

/// Coordinator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// How long a non-persistent notification stays displayed
    #[serde(with = "duration_str")]
    pub display_window: Duration,

    /// Message used when a flash does not carry one
    pub default_message: String,

    /// Message used when a query failure has no usable text
    pub query_error_fallback: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            display_window: Duration::from_secs(2),
            default_message: "Loading".to_string(),
            query_error_fallback: "There was an error querying the backend".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(NOTIFY_WINDOW_ENV) {
            self.notifications.display_window =
                humantime::parse_duration(&value).map_err(|source| ConfigError::Duration {
                    value,
                    origin: NOTIFY_WINDOW_ENV.to_string(),
                    source,
                })?;
        }
        Ok(self)
    }
}

/// Serde adapter for human-readable durations such as `"1500ms"` or `"2s"`
mod duration_str {
    use std::time::Duration;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.notifications.display_window, Duration::from_secs(2));
        assert_eq!(settings.notifications.default_message, "Loading");
    }

    #[test]
    fn test_parse_partial_json() {
        let settings = Settings::from_json_str(r#"{"notifications": {"display_window": "1500ms"}}"#).unwrap();
        assert_eq!(settings.notifications.display_window, Duration::from_millis(1500));
        assert_eq!(
            settings.notifications.query_error_fallback,
            "There was an error querying the backend"
        );
    }

    #[test]
    fn test_serialized_settings_parse_back() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_env_override() {
        let settings = Settings::default()
            .with_overrides(|key| (key == NOTIFY_WINDOW_ENV).then(|| "3s".to_string()))
            .unwrap();
        assert_eq!(settings.notifications.display_window, Duration::from_secs(3));

        let err = Settings::default()
            .with_overrides(|_| Some("soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Duration { .. }));
    }
}
