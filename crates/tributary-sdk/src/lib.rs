//! Connector framework for tributary sources.
//!
//! Provides the command-line entrypoint and launcher, the [`connector::Source`]
//! lifecycle trait, protocol-aware logging, and the file-based source
//! building blocks that object-store connectors are assembled from.

pub mod connector;
pub mod emitter;
pub mod entrypoint;
pub mod file_based;
pub mod files;
pub mod logging;
pub mod prelude;

pub use entrypoint::{extract_catalog, launch};
