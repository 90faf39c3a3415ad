//! JSON file loading for `--config`, `--catalog` and `--state` arguments.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Failure to load a JSON document from disk.
#[derive(Debug, thiserror::Error)]
pub enum ReadJsonError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read `path` and deserialize its JSON contents into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReadJsonError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReadJsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ReadJsonError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
