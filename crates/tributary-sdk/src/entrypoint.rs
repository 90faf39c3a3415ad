//! Command-line entrypoint shared by all source connectors.
//!
//! Connectors accept the protocol command surface:
//!
//! ```text
//! spec
//! check    --config <path>
//! discover --config <path>
//! read     --config <path> --catalog <path> [--state <path>]
//! ```
//!
//! [`launch`] parses these arguments, runs the command against a
//! [`Source`] and writes protocol messages to stdout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tributary_types::{
    ConfiguredCatalog, ConnectionStatus, ConnectorError, ErrorTrace, Message, StateMessage,
};

use crate::connector::Source;
use crate::emitter::Emitter;
use crate::files::{read_json, ReadJsonError};
use crate::logging;

#[derive(Debug, Parser)]
#[command(name = "source", about = "Tributary source connector", no_binary_name = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Output the connector specification
    Spec,
    /// Check a configuration against the remote system
    Check {
        /// Path to the JSON config file
        #[arg(long)]
        config: PathBuf,
    },
    /// Output the catalog of available streams
    Discover {
        /// Path to the JSON config file
        #[arg(long)]
        config: PathBuf,
    },
    /// Read records from the configured streams
    Read {
        /// Path to the JSON config file
        #[arg(long)]
        config: PathBuf,
        /// Path to the configured catalog
        #[arg(long)]
        catalog: PathBuf,
        /// Path to the state from the previous sync
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

/// Errors raised before a command reaches the connector.
#[derive(Debug, thiserror::Error)]
pub enum EntrypointError {
    #[error("invalid arguments: {0}")]
    Args(#[from] clap::Error),

    #[error(transparent)]
    File(#[from] ReadJsonError),
}

/// Parse connector arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<Cli, EntrypointError> {
    Ok(Cli::try_parse_from(args)?)
}

/// Extract the configured catalog path from connector arguments.
///
/// Returns `None` for commands that take no catalog and an error when the
/// arguments do not form a valid command line (an empty list included).
pub fn extract_catalog(args: &[String]) -> Result<Option<PathBuf>, EntrypointError> {
    let cli = parse_args(args)?;
    Ok(match cli.command {
        Command::Read { catalog, .. } => Some(catalog),
        Command::Spec | Command::Check { .. } | Command::Discover { .. } => None,
    })
}

/// Run `source` with `args` and write its output to stdout.
///
/// Blocks until the command finishes. Failures during `discover` and `read`
/// are reported as an ERROR trace before being returned.
pub fn launch<S: Source>(mut source: S, args: &[String]) -> anyhow::Result<()> {
    let cli = parse_args(args)?;
    logging::init(cli.debug);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create connector runtime")?;

    let mut emitter = Emitter::new(std::io::stdout());
    runtime.block_on(run_command(&mut source, cli.command, &mut emitter))
}

/// Execute a parsed command against `source`.
pub async fn run_command<S: Source, W: Write>(
    source: &mut S,
    command: Command,
    emitter: &mut Emitter<W>,
) -> anyhow::Result<()> {
    match command {
        Command::Spec => {
            emitter.emit(&Message::spec(source.spec()))?;
        }
        Command::Check { config } => {
            let status = match read_json::<S::Config>(&config) {
                Err(e) => ConnectionStatus::failed(format!("Config validation error: {e}")),
                Ok(config) => match source.check(&config).await {
                    Ok(()) => ConnectionStatus::succeeded(),
                    Err(e) => {
                        tracing::error!(error = %e, "check failed");
                        ConnectionStatus::failed(e.to_string())
                    }
                },
            };
            emitter.emit(&Message::connection_status(status))?;
        }
        Command::Discover { config } => {
            let config = load::<S::Config, W>(&config, emitter)?;
            match source.discover(&config).await {
                Ok(catalog) => emitter.emit(&Message::catalog(catalog))?,
                Err(e) => return Err(report(emitter, e)),
            }
        }
        Command::Read {
            config,
            catalog,
            state,
        } => {
            let config = load::<S::Config, W>(&config, emitter)?;
            let catalog = load::<ConfiguredCatalog, W>(&catalog, emitter)?;
            let state = match state {
                Some(path) => load::<Vec<StateMessage>, W>(&path, emitter)?,
                None => Vec::new(),
            };
            tracing::info!(streams = catalog.streams.len(), "starting read");
            if let Err(e) = source.read(&config, &catalog, &state, emitter).await {
                return Err(report(emitter, e));
            }
            tracing::info!("finished read");
        }
    }
    Ok(())
}

/// Load a JSON argument file, reporting a config error trace on failure.
fn load<T: serde::de::DeserializeOwned, W: Write>(
    path: &std::path::Path,
    emitter: &mut Emitter<W>,
) -> anyhow::Result<T> {
    read_json(path).map_err(|e| {
        report(
            emitter,
            ConnectorError::config("INVALID_INPUT_FILE", e.to_string()),
        )
    })
}

/// Write an ERROR trace for `error` and convert it for propagation.
fn report<W: Write>(emitter: &mut Emitter<W>, error: ConnectorError) -> anyhow::Error {
    let trace = ErrorTrace::new(error.message.clone())
        .with_internal_message(error.to_string())
        .with_stack_trace(format!("{error:?}"))
        .with_failure_type(error.failure_type());
    if let Err(io) = emitter.error_trace(trace) {
        tracing::error!(error = %io, "failed to emit error trace");
    }
    anyhow::Error::new(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn extract_catalog_from_read() {
        let path = extract_catalog(&args(&[
            "read",
            "--config",
            "secrets/config.json",
            "--catalog",
            "catalog.json",
        ]))
        .unwrap();
        assert_eq!(path, Some(PathBuf::from("catalog.json")));
    }

    #[test]
    fn extract_catalog_none_for_other_commands() {
        assert_eq!(extract_catalog(&args(&["spec"])).unwrap(), None);
        assert_eq!(
            extract_catalog(&args(&["check", "--config", "c.json"])).unwrap(),
            None
        );
        assert_eq!(
            extract_catalog(&args(&["discover", "--config", "c.json"])).unwrap(),
            None
        );
    }

    #[test]
    fn extract_catalog_rejects_empty_args() {
        let err = extract_catalog(&[]).unwrap_err();
        assert!(matches!(err, EntrypointError::Args(_)));
    }

    #[test]
    fn extract_catalog_rejects_flags_without_command() {
        let err = extract_catalog(&args(&["--config", "c.json", "--catalog", "catalog.json"]))
            .unwrap_err();
        assert!(matches!(err, EntrypointError::Args(_)));
    }

    #[test]
    fn read_requires_catalog() {
        assert!(parse_args(&args(&["read", "--config", "c.json"])).is_err());
    }

    #[test]
    fn debug_flag_is_global() {
        let cli = parse_args(&args(&["spec", "--debug"])).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.command, Command::Spec);
    }

    #[test]
    fn read_state_is_optional() {
        let cli = parse_args(&args(&[
            "read", "--config", "c.json", "--catalog", "k.json", "--state", "s.json",
        ]))
        .unwrap();
        match cli.command {
            Command::Read { state, .. } => assert_eq!(state, Some(PathBuf::from("s.json"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
