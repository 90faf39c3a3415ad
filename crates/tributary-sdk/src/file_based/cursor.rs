//! Incremental sync cursors for file-based streams.
//!
//! The default cursor remembers the last-modified time of every synced file
//! (up to a bounded history) and skips files that have not changed since.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};

use super::error::FileBasedError;
use super::remote_file::RemoteFile;
use super::spec::FileStreamConfig;

/// Timestamp format used in cursor state and record metadata.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const HISTORY_KEY: &str = "history";
const CURSOR_KEY: &str = "_ab_source_file_last_modified";

/// Decides which files of a stream still need syncing and renders the
/// stream's state once they have been synced.
pub trait FileCursor {
    fn new(stream: &FileStreamConfig, start_date: Option<DateTime<Utc>>) -> Self
    where
        Self: Sized;

    /// Restore from state saved by a previous sync.
    fn set_initial_state(&mut self, state: &Value) -> Result<(), FileBasedError>;

    fn should_sync_file(&self, file: &RemoteFile) -> bool;

    /// Record that `file` has been synced.
    fn add_file(&mut self, file: &RemoteFile);

    fn state(&self) -> Value;
}

/// History-based cursor keyed by file URI.
#[derive(Debug, Clone)]
pub struct DefaultFileCursor {
    stream: String,
    history: HashMap<String, DateTime<Utc>>,
    max_history_size: usize,
    time_window: Duration,
    start_date: Option<DateTime<Utc>>,
    /// Earliest file in the restored history, when that history was full.
    initial_earliest: Option<(DateTime<Utc>, String)>,
}

impl DefaultFileCursor {
    pub const DEFAULT_MAX_HISTORY_SIZE: usize = 10_000;

    #[must_use]
    pub fn with_max_history_size(mut self, size: usize) -> Self {
        self.max_history_size = size;
        self
    }

    fn is_history_full(&self) -> bool {
        self.history.len() >= self.max_history_size
    }

    fn earliest(&self) -> Option<(DateTime<Utc>, &str)> {
        self.history
            .iter()
            .map(|(uri, ts)| (*ts, uri.as_str()))
            .min()
    }

    fn latest(&self) -> Option<(DateTime<Utc>, &str)> {
        self.history
            .iter()
            .map(|(uri, ts)| (*ts, uri.as_str()))
            .max()
    }

    /// Files older than this are skipped; only set once the history is full.
    fn start_time(&self) -> Option<DateTime<Utc>> {
        if !self.is_history_full() {
            return None;
        }
        self.earliest().map(|(ts, _)| ts - self.time_window)
    }

    fn invalid_state(&self, reason: impl Into<String>) -> FileBasedError {
        FileBasedError::InvalidState {
            stream: self.stream.clone(),
            reason: reason.into(),
        }
    }
}

impl FileCursor for DefaultFileCursor {
    fn new(stream: &FileStreamConfig, start_date: Option<DateTime<Utc>>) -> Self {
        Self {
            stream: stream.name.clone(),
            history: HashMap::new(),
            max_history_size: Self::DEFAULT_MAX_HISTORY_SIZE,
            time_window: Duration::days(i64::from(stream.days_to_sync_if_history_is_full)),
            start_date,
            initial_earliest: None,
        }
    }

    fn set_initial_state(&mut self, state: &Value) -> Result<(), FileBasedError> {
        let Some(history) = state.get(HISTORY_KEY) else {
            return Ok(());
        };
        let history = history
            .as_object()
            .ok_or_else(|| self.invalid_state("history is not an object"))?;

        for (uri, ts) in history {
            let raw = ts
                .as_str()
                .ok_or_else(|| self.invalid_state(format!("timestamp for '{uri}' is not a string")))?;
            let parsed = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
                .map_err(|e| self.invalid_state(format!("bad timestamp '{raw}' for '{uri}': {e}")))?;
            self.history.insert(uri.clone(), parsed.and_utc());
        }

        if self.is_history_full() {
            self.initial_earliest = self.earliest().map(|(ts, uri)| (ts, uri.to_string()));
        }
        tracing::debug!(
            stream = %self.stream,
            files = self.history.len(),
            "restored cursor history"
        );
        Ok(())
    }

    fn should_sync_file(&self, file: &RemoteFile) -> bool {
        if self.start_date.is_some_and(|start| file.last_modified < start) {
            return false;
        }
        if self.start_time().is_some_and(|start| file.last_modified < start) {
            return false;
        }
        if let Some(seen) = self.history.get(&file.uri) {
            if file.last_modified < *seen {
                tracing::warn!(
                    stream = %self.stream,
                    uri = %file.uri,
                    "file last-modified time is older than the synced copy"
                );
            }
            return file.last_modified > *seen;
        }
        if self.is_history_full() {
            return match &self.initial_earliest {
                None => true,
                Some((ts, uri)) => (file.last_modified, file.uri.as_str()) > (*ts, uri.as_str()),
            };
        }
        true
    }

    fn add_file(&mut self, file: &RemoteFile) {
        self.history.insert(file.uri.clone(), file.last_modified);
        if self.history.len() > self.max_history_size {
            if let Some(oldest) = self.earliest().map(|(_, uri)| uri.to_string()) {
                self.history.remove(&oldest);
            }
        }
    }

    fn state(&self) -> Value {
        let history: Map<String, Value> = self
            .history
            .iter()
            .map(|(uri, ts)| (uri.clone(), Value::String(ts.format(DATE_TIME_FORMAT).to_string())))
            .collect();
        let cursor = self
            .latest()
            .map_or(Value::Null, |(ts, uri)| {
                Value::String(format!("{}_{uri}", ts.format(DATE_TIME_FORMAT)))
            });
        json!({ HISTORY_KEY: history, CURSOR_KEY: cursor })
    }
}
