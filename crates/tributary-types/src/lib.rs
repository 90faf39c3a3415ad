//! Shared tributary protocol types.
//!
//! Everything a connector writes to stdout is a [`message::Message`]; this
//! crate owns that wire model plus the catalog and error types built on it.

pub mod catalog;
pub mod error;
pub mod message;
pub mod state;
pub mod trace;

pub use catalog::{
    Catalog, ConfiguredCatalog, ConfiguredStream, DestinationSyncMode, Stream, StreamDescriptor,
    SyncMode,
};
pub use error::{ConnectorError, ErrorCategory};
pub use message::{
    ConnectionStatus, ConnectorSpecification, LogLevel, LogMessage, Message, MessageType,
    RecordMessage, Status,
};
pub use state::{StateMessage, StateType, StreamState};
pub use trace::{ErrorTrace, FailureType, StreamStatus, StreamStatusTrace, TraceMessage, TraceType};
