//! Stream catalog types.
//!
//! A [`Catalog`] is what a source reports from `discover`. A
//! [`ConfiguredCatalog`] is what the platform hands back to `read`: the
//! subset of streams it wants, each with the chosen sync mode.

use serde::{Deserialize, Serialize};

/// How a source reads a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    FullRefresh,
    Incremental,
}

/// How the destination applies records from a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationSyncMode {
    #[default]
    Append,
    Overwrite,
    AppendDedup,
}

/// Name plus optional namespace identifying a stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl StreamDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}

/// A stream exposed by a source connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    /// Stream name, unique within a catalog.
    pub name: String,
    /// JSON schema describing the records of this stream.
    pub json_schema: serde_json::Value,
    /// Sync modes this stream supports.
    pub supported_sync_modes: Vec<SyncMode>,
    /// Whether the source decides the cursor field itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_cursor: Option<bool>,
    /// Cursor path used when the source defines the cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cursor_field: Option<Vec<String>>,
    /// Primary key paths declared by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Streams discovered by a source connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<Stream>,
}

/// A stream selected for a sync, with its chosen modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredStream {
    pub stream: Stream,
    pub sync_mode: SyncMode,
    #[serde(default)]
    pub destination_sync_mode: DestinationSyncMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_field: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<Vec<String>>>,
}

/// Streams selected for a `read`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    /// Names of all configured streams, in catalog order.
    pub fn stream_names(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(|s| s.stream.name.as_str())
    }

    /// Look up a configured stream by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConfiguredStream> {
        self.streams.iter().find(|s| s.stream.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users_stream() -> Stream {
        Stream {
            name: "users".into(),
            json_schema: json!({"type": "object"}),
            supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
            source_defined_cursor: Some(true),
            default_cursor_field: Some(vec!["_ab_source_file_last_modified".into()]),
            source_defined_primary_key: None,
            namespace: None,
        }
    }

    #[test]
    fn sync_mode_snake_case() {
        let json = serde_json::to_string(&SyncMode::FullRefresh).unwrap();
        assert_eq!(json, "\"full_refresh\"");
        let mode: DestinationSyncMode = serde_json::from_str("\"append_dedup\"").unwrap();
        assert_eq!(mode, DestinationSyncMode::AppendDedup);
    }

    #[test]
    fn stream_optional_fields_skipped() {
        let mut s = users_stream();
        s.source_defined_cursor = None;
        s.default_cursor_field = None;
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("source_defined_cursor").is_none());
        assert!(json.get("default_cursor_field").is_none());
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn configured_catalog_parses_minimal_document() {
        let raw = json!({
            "streams": [{
                "stream": {
                    "name": "users",
                    "json_schema": {"type": "object"},
                    "supported_sync_modes": ["full_refresh"]
                },
                "sync_mode": "full_refresh"
            }]
        });
        let catalog: ConfiguredCatalog = serde_json::from_value(raw).unwrap();
        assert_eq!(catalog.streams.len(), 1);
        assert_eq!(
            catalog.streams[0].destination_sync_mode,
            DestinationSyncMode::Append
        );
        assert_eq!(catalog.stream_names().collect::<Vec<_>>(), vec!["users"]);
    }

    #[test]
    fn configured_catalog_lookup() {
        let catalog = ConfiguredCatalog {
            streams: vec![ConfiguredStream {
                stream: users_stream(),
                sync_mode: SyncMode::Incremental,
                destination_sync_mode: DestinationSyncMode::Append,
                cursor_field: None,
                primary_key: None,
            }],
        };
        assert!(catalog.get("users").is_some());
        assert!(catalog.get("orders").is_none());
    }
}
