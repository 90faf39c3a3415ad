//! Convenience re-exports for connector authors.
//!
//! ```ignore
//! use tributary_sdk::prelude::*;
//! ```

// Lifecycle
pub use crate::connector::Source;
pub use crate::emitter::{now_millis, Emitter};
pub use crate::entrypoint::{extract_catalog, launch, EntrypointError};

// File-based building blocks
pub use crate::file_based::{
    DefaultFileCursor, FileBasedError, FileBasedSource, FileBasedSpec, FileCursor,
    FileStreamConfig, RemoteFile, StreamReader,
};

// Protocol types
pub use tributary_types::{
    Catalog, ConfiguredCatalog, ConnectionStatus, ConnectorError, ConnectorSpecification,
    ErrorTrace, Message, StateMessage, Stream, StreamDescriptor, SyncMode, TraceMessage,
};
