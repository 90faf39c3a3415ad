//! Building blocks for sources that sync files from an object store.
//!
//! A [`FileBasedSource`] is assembled from three collaborators: a
//! [`StreamReader`] that lists files, a [`FileBasedSpec`] config type, and a
//! [`FileCursor`] type that decides which files still need syncing.

mod cursor;
mod error;
pub mod globs;
mod remote_file;
mod source;
mod spec;
mod stream_reader;

pub use cursor::{DefaultFileCursor, FileCursor, DATE_TIME_FORMAT};
pub use error::FileBasedError;
pub use remote_file::RemoteFile;
pub use source::{
    file_record_schema, FileBasedSource, FILE_LAST_MODIFIED_COLUMN, FILE_URI_COLUMN, FILE_URL_COLUMN,
};
pub use spec::{FileBasedSpec, FileStreamConfig};
pub use stream_reader::StreamReader;
