//! Generic file-based source.

use std::collections::HashMap;
use std::io::Write;
use std::marker::PhantomData;
use std::path::Path;

use serde_json::{json, Map, Value};
use tributary_types::state::find_stream_state;
use tributary_types::{
    Catalog, ConfiguredCatalog, ConfiguredStream, ConnectorError, ConnectorSpecification,
    StateMessage, Stream, StreamDescriptor, StreamStatus, SyncMode,
};

use super::cursor::{FileCursor, DATE_TIME_FORMAT};
use super::error::FileBasedError;
use super::spec::{FileBasedSpec, FileStreamConfig};
use super::stream_reader::StreamReader;
use crate::connector::Source;
use crate::emitter::Emitter;
use crate::files::read_json;

/// Fully-qualified location of the file a record was produced from.
pub const FILE_URI_COLUMN: &str = "file_uri";
/// Key of the file relative to the store root.
pub const FILE_URL_COLUMN: &str = "_ab_source_file_url";
/// Last-modified time of the file, in [`DATE_TIME_FORMAT`].
pub const FILE_LAST_MODIFIED_COLUMN: &str = "_ab_source_file_last_modified";

/// A source that syncs one record per matching file, assembled from a
/// stream reader `R`, a config type `C` and a cursor type `Cur`.
pub struct FileBasedSource<R, C, Cur> {
    stream_reader: R,
    catalog: Option<ConfiguredCatalog>,
    stream_schemas: HashMap<String, Value>,
    _types: PhantomData<fn() -> (C, Cur)>,
}

impl<R, C, Cur> FileBasedSource<R, C, Cur>
where
    R: StreamReader<Config = C>,
    C: FileBasedSpec,
    Cur: FileCursor,
{
    /// Assemble the source. When `catalog_path` is given the configured
    /// catalog is loaded now, so an unreadable catalog fails construction.
    pub fn new(stream_reader: R, catalog_path: Option<&Path>) -> Result<Self, FileBasedError> {
        let catalog = catalog_path
            .map(read_json::<ConfiguredCatalog>)
            .transpose()?;

        let mut stream_schemas = HashMap::new();
        if let Some(catalog) = &catalog {
            for configured in &catalog.streams {
                let name = configured.stream.name.clone();
                if stream_schemas
                    .insert(name.clone(), configured.stream.json_schema.clone())
                    .is_some()
                {
                    return Err(FileBasedError::DuplicateStream(name));
                }
            }
        }

        Ok(Self {
            stream_reader,
            catalog,
            stream_schemas,
            _types: PhantomData,
        })
    }

    /// Catalog loaded at construction, if any.
    pub fn catalog(&self) -> Option<&ConfiguredCatalog> {
        self.catalog.as_ref()
    }

    pub fn stream_reader(&self) -> &R {
        &self.stream_reader
    }

    async fn configure(&mut self, config: &C) -> Result<(), ConnectorError> {
        config.validate()?;
        for stream in config.streams() {
            stream.validate()?;
        }
        self.stream_reader.set_config(config).await
    }

    fn discovered_stream(&self, stream: &FileStreamConfig) -> Stream {
        let json_schema = self
            .stream_schemas
            .get(&stream.name)
            .cloned()
            .unwrap_or_else(file_record_schema);
        Stream {
            name: stream.name.clone(),
            json_schema,
            supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
            source_defined_cursor: Some(true),
            default_cursor_field: Some(vec![FILE_LAST_MODIFIED_COLUMN.to_string()]),
            source_defined_primary_key: stream.primary_key.as_ref().map(|pk| vec![vec![pk.clone()]]),
            namespace: None,
        }
    }

    async fn read_stream<W: Write>(
        &self,
        config: &C,
        configured: &ConfiguredStream,
        state: &[StateMessage],
        emitter: &mut Emitter<W>,
    ) -> Result<(), ConnectorError> {
        let name = configured.stream.name.as_str();
        let stream = config.stream(name).ok_or_else(|| {
            ConnectorError::config(
                "UNKNOWN_STREAM",
                format!("stream '{name}' is in the catalog but not in the config"),
            )
        })?;

        let incremental = configured.sync_mode == SyncMode::Incremental;
        let mut cursor = Cur::new(stream, config.start_date());
        if incremental {
            if let Some(saved) = find_stream_state(state, name) {
                cursor
                    .set_initial_state(saved)
                    .map_err(|e| ConnectorError::config("INVALID_STATE", e.to_string()))?;
            }
        }

        let mut files = self.stream_reader.get_matching_files(&stream.globs).await?;
        if let Some(start) = config.start_date() {
            files.retain(|f| f.last_modified >= start);
        }
        files.sort_by(|a, b| (a.last_modified, &a.uri).cmp(&(b.last_modified, &b.uri)));

        let mut synced = 0usize;
        for file in &files {
            if incremental && !cursor.should_sync_file(file) {
                continue;
            }
            let mut data = Map::new();
            data.insert(
                FILE_URI_COLUMN.into(),
                Value::String(self.stream_reader.file_uri(file)),
            );
            data.insert(FILE_URL_COLUMN.into(), Value::String(file.uri.clone()));
            data.insert(
                FILE_LAST_MODIFIED_COLUMN.into(),
                Value::String(file.last_modified.format(DATE_TIME_FORMAT).to_string()),
            );
            emitter.record(name, data)?;
            cursor.add_file(file);
            synced += 1;
        }

        if incremental {
            emitter.state(StateMessage::stream(StreamDescriptor::new(name), cursor.state()))?;
        }
        tracing::info!(stream = name, matched = files.len(), synced, "stream read");
        Ok(())
    }
}

impl<R, C, Cur> Source for FileBasedSource<R, C, Cur>
where
    R: StreamReader<Config = C>,
    C: FileBasedSpec,
    Cur: FileCursor,
{
    type Config = C;

    fn spec(&self) -> ConnectorSpecification {
        ConnectorSpecification {
            documentation_url: C::documentation_url(),
            connection_specification: C::json_schema(),
        }
    }

    async fn check(&mut self, config: &C) -> Result<(), ConnectorError> {
        self.configure(config).await?;
        let Some(first) = config.streams().first() else {
            return Ok(());
        };
        let files = self.stream_reader.get_matching_files(&first.globs).await?;
        tracing::info!(stream = %first.name, files = files.len(), "check listed files");
        Ok(())
    }

    async fn discover(&mut self, config: &C) -> Result<Catalog, ConnectorError> {
        self.configure(config).await?;
        let streams = config
            .streams()
            .iter()
            .map(|s| self.discovered_stream(s))
            .collect();
        Ok(Catalog { streams })
    }

    async fn read<W: Write>(
        &mut self,
        config: &C,
        catalog: &ConfiguredCatalog,
        state: &[StateMessage],
        emitter: &mut Emitter<W>,
    ) -> Result<(), ConnectorError> {
        self.configure(config).await?;
        for configured in &catalog.streams {
            let name = configured.stream.name.as_str();
            emitter.stream_status(name, StreamStatus::Started)?;
            if let Err(e) = self.read_stream(config, configured, state, emitter).await {
                emitter.stream_status(name, StreamStatus::Incomplete)?;
                return Err(e);
            }
            emitter.stream_status(name, StreamStatus::Complete)?;
        }
        Ok(())
    }
}

/// Schema of the records a file-based stream produces.
#[must_use]
pub fn file_record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            FILE_URI_COLUMN: {"type": "string"},
            FILE_URL_COLUMN: {"type": "string"},
            FILE_LAST_MODIFIED_COLUMN: {"type": "string", "format": "date-time"}
        }
    })
}
