//! Async-first source connector lifecycle.

use std::io::Write;

use serde::de::DeserializeOwned;
use tributary_types::{
    Catalog, ConfiguredCatalog, ConnectorError, ConnectorSpecification, StateMessage,
};

use crate::emitter::Emitter;

/// Source connector lifecycle, driven by [`launch`](crate::entrypoint::launch).
///
/// `Config` is deserialized from the `--config` file before any method that
/// takes it runs; a parse failure never reaches the connector.
#[allow(async_fn_in_trait)]
pub trait Source {
    type Config: DeserializeOwned;

    /// Describe the connector and the schema of its configuration.
    fn spec(&self) -> ConnectorSpecification;

    /// Verify that `config` is usable, e.g. credentials and reachability.
    async fn check(&mut self, config: &Self::Config) -> Result<(), ConnectorError>;

    /// Report the streams this source can read.
    async fn discover(&mut self, config: &Self::Config) -> Result<Catalog, ConnectorError>;

    /// Read every stream in `catalog`, writing records, state and status
    /// traces to `emitter` as they are produced.
    async fn read<W: Write>(
        &mut self,
        config: &Self::Config,
        catalog: &ConfiguredCatalog,
        state: &[StateMessage],
        emitter: &mut Emitter<W>,
    ) -> Result<(), ConnectorError>;
}
