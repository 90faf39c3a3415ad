use tributary_types::ConnectorError;

use super::remote_file::RemoteFile;
use super::spec::FileBasedSpec;

/// Lists files in a remote store on behalf of a [`FileBasedSource`](super::FileBasedSource).
///
/// The reader is constructed unconfigured; the source hands it the parsed
/// config via [`set_config`](StreamReader::set_config) before listing.
#[allow(async_fn_in_trait)]
pub trait StreamReader {
    type Config: FileBasedSpec;

    /// Adopt `config`, building any client the listing needs.
    async fn set_config(&mut self, config: &Self::Config) -> Result<(), ConnectorError>;

    /// Files whose keys match any of `globs`.
    async fn get_matching_files(&self, globs: &[String]) -> Result<Vec<RemoteFile>, ConnectorError>;

    /// Fully-qualified location of `file`, e.g. `s3://bucket/key`.
    fn file_uri(&self, file: &RemoteFile) -> String;
}
