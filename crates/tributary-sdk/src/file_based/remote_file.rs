use chrono::{DateTime, Utc};

/// A file found in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteFile {
    /// Key of the file relative to the store root.
    pub uri: String,
    pub last_modified: DateTime<Utc>,
    pub size: Option<u64>,
}

impl RemoteFile {
    pub fn new(uri: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            uri: uri.into(),
            last_modified,
            size: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}
