//! Configuration contract for file-based sources.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tributary_types::ConnectorError;

/// Per-stream settings shared by every file-based source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStreamConfig {
    /// Stream name as it appears in the catalog.
    pub name: String,
    /// Glob patterns selecting the files that belong to this stream.
    #[serde(default = "default_globs")]
    pub globs: Vec<String>,
    /// How far back to look once the cursor history is full.
    #[serde(default = "default_days_to_sync")]
    pub days_to_sync_if_history_is_full: u32,
    /// Record field to declare as the stream's primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

fn default_globs() -> Vec<String> {
    vec!["**".to_string()]
}

fn default_days_to_sync() -> u32 {
    3
}

impl FileStreamConfig {
    /// Check the settings that apply regardless of the backing store.
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.name.trim().is_empty() {
            return Err(ConnectorError::config(
                "INVALID_CONFIG",
                "stream name must not be empty",
            ));
        }
        if self.globs.is_empty() {
            return Err(ConnectorError::config(
                "INVALID_CONFIG",
                format!("stream '{}' must declare at least one glob", self.name),
            ));
        }
        if let Some(bad) = self.globs.iter().find(|g| glob::Pattern::new(g).is_err()) {
            return Err(ConnectorError::config(
                "INVALID_CONFIG",
                format!("stream '{}' has an invalid glob '{bad}'", self.name),
            ));
        }
        Ok(())
    }
}

/// A connector configuration type usable by [`FileBasedSource`](super::FileBasedSource).
pub trait FileBasedSpec: DeserializeOwned {
    /// Link shown alongside the configuration form.
    fn documentation_url() -> Option<String> {
        None
    }

    /// JSON schema of the configuration, reported by `spec`.
    fn json_schema() -> serde_json::Value;

    fn streams(&self) -> &[FileStreamConfig];

    /// Files modified before this instant are never synced.
    fn start_date(&self) -> Option<DateTime<Utc>>;

    /// Validate store-specific settings. Stream settings are validated by the caller.
    fn validate(&self) -> Result<(), ConnectorError>;

    /// Look up a stream's settings by name.
    fn stream(&self, name: &str) -> Option<&FileStreamConfig> {
        self.streams().iter().find(|s| s.name == name)
    }
}
