//! S3 source connector: S3 collaborators for the file-based source and the
//! process bootstrap that assembles them.

pub mod bootstrap;
pub mod config;
pub mod stream_reader;

use tributary_sdk::file_based::{DefaultFileCursor, FileBasedSource};

pub use bootstrap::{get_source, run, STARTUP_ERROR_MESSAGE};
pub use config::Config;
pub use stream_reader::SourceS3StreamReader;

/// The S3 connector: S3 listing, S3 config and the default file cursor.
pub type SourceS3 = FileBasedSource<SourceS3StreamReader, Config, DefaultFileCursor>;
