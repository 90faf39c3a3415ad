//! Source S3 connector configuration.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tributary_sdk::prelude::*;

/// S3 connection and stream config from the `--config` file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub bucket: String,
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible stores. Enables path-style addressing.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
    /// Files modified before this time are never synced.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    pub streams: Vec<FileStreamConfig>,
}

impl Config {
    /// Static credentials, when both halves of the key pair are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl FileBasedSpec for Config {
    fn json_schema() -> serde_json::Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "S3 Source Spec",
            "type": "object",
            "required": ["bucket", "streams"],
            "properties": {
                "bucket": {
                    "type": "string",
                    "title": "Bucket",
                    "description": "Name of the S3 bucket where the files exist.",
                    "order": 0
                },
                "aws_access_key_id": {
                    "type": "string",
                    "title": "AWS Access Key ID",
                    "description": "Access key of an identity that can list the bucket. Leave empty to use the default credential chain.",
                    "airbyte_secret": true,
                    "order": 1
                },
                "aws_secret_access_key": {
                    "type": "string",
                    "title": "AWS Secret Access Key",
                    "airbyte_secret": true,
                    "order": 2
                },
                "endpoint": {
                    "type": "string",
                    "title": "Endpoint",
                    "description": "Endpoint of an S3-compatible service. Leave empty for AWS.",
                    "default": "",
                    "order": 3
                },
                "region_name": {
                    "type": "string",
                    "title": "Region",
                    "order": 4
                },
                "start_date": {
                    "type": "string",
                    "title": "Start Date",
                    "description": "UTC date and time in the format 2021-01-01T00:00:00.000000Z. Files modified before this date are not synced.",
                    "format": "date-time",
                    "pattern": "^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\\.[0-9]+)?Z$",
                    "order": 5
                },
                "streams": {
                    "type": "array",
                    "title": "Streams",
                    "minItems": 1,
                    "order": 6,
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": {"type": "string", "title": "Name"},
                            "globs": {
                                "type": "array",
                                "title": "Globs",
                                "items": {"type": "string"},
                                "default": ["**"]
                            },
                            "days_to_sync_if_history_is_full": {
                                "type": "integer",
                                "title": "Days To Sync If History Is Full",
                                "default": 3
                            },
                            "primary_key": {"type": "string", "title": "Primary Key"}
                        }
                    }
                }
            }
        })
    }

    fn streams(&self) -> &[FileStreamConfig] {
        &self.streams
    }

    fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    fn validate(&self) -> Result<(), ConnectorError> {
        if self.bucket.trim().is_empty() {
            return Err(ConnectorError::config(
                "INVALID_CONFIG",
                "bucket must not be empty",
            ));
        }
        if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
            return Err(ConnectorError::config(
                "INVALID_CONFIG",
                "aws_access_key_id and aws_secret_access_key must be set together",
            ));
        }
        if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConnectorError::config(
                    "INVALID_CONFIG",
                    format!("endpoint '{endpoint}' must start with http:// or https://"),
                ));
            }
        }
        if self.streams.is_empty() {
            return Err(ConnectorError::config(
                "INVALID_CONFIG",
                "at least one stream must be configured",
            ));
        }
        let mut names = HashSet::new();
        for stream in &self.streams {
            if !names.insert(stream.name.as_str()) {
                return Err(ConnectorError::config(
                    "INVALID_CONFIG",
                    format!("stream name '{}' is used more than once", stream.name),
                ));
            }
        }
        Ok(())
    }
}
