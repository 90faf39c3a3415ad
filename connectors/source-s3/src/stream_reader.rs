//! S3 object listing for the file-based source.

use std::collections::HashSet;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use serde_json::json;
use tributary_sdk::file_based::globs::{listing_prefixes, GlobSet};
use tributary_sdk::prelude::*;

use crate::config::Config;

/// Error codes S3 returns for requests the configured identity cannot make.
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
];

/// Lists objects in the configured bucket. Created unconfigured; the
/// config arrives through [`StreamReader::set_config`] once the command
/// has read it, and the S3 client is built once at that point.
#[derive(Debug, Default)]
pub struct SourceS3StreamReader {
    config: Option<Config>,
    client: Option<Client>,
}

impl SourceS3StreamReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    fn require_client(&self) -> Result<(&Config, &Client), ConnectorError> {
        match (&self.config, &self.client) {
            (Some(config), Some(client)) => Ok((config, client)),
            _ => Err(ConnectorError::internal(
                "READER_NOT_CONFIGURED",
                "stream reader used before a config was set",
            )),
        }
    }

    async fn build_client(config: &Config) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region_name {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some((access_key_id, secret_access_key)) = config.credentials() {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "source-s3-config",
            ));
        }
        let endpoint = config.endpoint.as_deref().filter(|e| !e.is_empty());
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(endpoint.is_some())
            .build();
        Client::from_conf(s3_config)
    }
}

impl StreamReader for SourceS3StreamReader {
    type Config = Config;

    async fn set_config(&mut self, config: &Config) -> Result<(), ConnectorError> {
        self.client = Some(Self::build_client(config).await);
        self.config = Some(config.clone());
        Ok(())
    }

    async fn get_matching_files(&self, globs: &[String]) -> Result<Vec<RemoteFile>, ConnectorError> {
        let (config, client) = self.require_client()?;
        let matcher = GlobSet::new(globs).map_err(|e| {
            ConnectorError::config("INVALID_GLOB", format!("invalid glob pattern: {e}"))
        })?;

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for prefix in listing_prefixes(globs) {
            tracing::debug!(bucket = %config.bucket, prefix = %prefix, "Listing objects");
            let mut pages = client
                .list_objects_v2()
                .bucket(&config.bucket)
                .prefix(&prefix)
                .into_paginator()
                .send();

            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| list_error(&config.bucket, e))?;
                for object in page.contents() {
                    let Some(key) = object.key() else { continue };
                    if key.ends_with('/') || !matcher.matches(key) || !seen.insert(key.to_owned()) {
                        continue;
                    }
                    let last_modified = object
                        .last_modified()
                        .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
                        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                    let mut file = RemoteFile::new(key, last_modified);
                    if let Some(size) = object.size().and_then(|s| u64::try_from(s).ok()) {
                        file = file.with_size(size);
                    }
                    files.push(file);
                }
            }
        }

        tracing::info!(bucket = %config.bucket, count = files.len(), "Matched files");
        Ok(files)
    }

    fn file_uri(&self, file: &RemoteFile) -> String {
        match &self.config {
            Some(config) => s3_uri(&config.bucket, &file.uri),
            None => file.uri.clone(),
        }
    }
}

pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

fn list_error<E>(bucket: &str, err: E) -> ConnectorError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().unwrap_or_default().to_owned();
    let text = DisplayErrorContext(&err).to_string();
    if code == "NoSuchBucket" {
        ConnectorError::config("NO_SUCH_BUCKET", format!("bucket '{bucket}' does not exist"))
            .with_details(json!({ "error": text }))
    } else if AUTH_ERROR_CODES.contains(&code.as_str()) {
        ConnectorError::auth(
            "S3_ACCESS_DENIED",
            format!("cannot list bucket '{bucket}' ({code})"),
        )
        .with_details(json!({ "error": text }))
    } else {
        ConnectorError::transient_network("S3_LIST_FAILED", format!("listing '{bucket}' failed"))
            .with_details(json!({ "error": text }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        serde_json::from_value(serde_json::json!({
            "bucket": "raw-events",
            "streams": [{"name": "events"}]
        }))
        .unwrap()
    }

    #[test]
    fn file_uri_includes_bucket() {
        let reader = SourceS3StreamReader {
            config: Some(config()),
            client: None,
        };
        let file = RemoteFile::new("2024/01/a.jsonl", DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(reader.file_uri(&file), "s3://raw-events/2024/01/a.jsonl");
    }

    #[test]
    fn new_reader_has_no_config() {
        let reader = SourceS3StreamReader::new();
        assert!(reader.config().is_none());
        let err = reader.require_client().unwrap_err();
        assert_eq!(err.code, "READER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn listing_without_config_fails() {
        let reader = SourceS3StreamReader::new();
        let err = reader
            .get_matching_files(&["**".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.code, "READER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn set_config_builds_client_once() {
        let mut raw = serde_json::json!({
            "bucket": "raw-events",
            "aws_access_key_id": "AKIA123",
            "aws_secret_access_key": "secret",
            "region_name": "eu-west-1",
            "endpoint": "http://127.0.0.1:9000",
            "streams": [{"name": "events"}]
        });
        let first: Config = serde_json::from_value(raw.clone()).unwrap();
        let mut reader = SourceS3StreamReader::new();
        reader.set_config(&first).await.unwrap();

        let (config, client) = reader.require_client().unwrap();
        assert_eq!(config.bucket, "raw-events");
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );

        raw["region_name"] = serde_json::json!("us-west-2");
        let moved: Config = serde_json::from_value(raw).unwrap();
        reader.set_config(&moved).await.unwrap();
        let (_, client) = reader.require_client().unwrap();
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some("us-west-2")
        );
    }
}
