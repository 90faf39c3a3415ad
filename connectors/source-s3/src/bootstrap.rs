//! Process bootstrap: assemble the connector, or report why it could not
//! be assembled.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use tributary_sdk::emitter::{now_millis, Emitter};
use tributary_sdk::extract_catalog;
use tributary_types::{ErrorTrace, Message, TraceMessage};

use crate::{SourceS3, SourceS3StreamReader};

/// Fixed user-facing message of the startup failure trace.
pub const STARTUP_ERROR_MESSAGE: &str = "Error starting the sync. This could be due to an invalid configuration or catalog. Please contact Support for assistance.";

/// Build the connector from `args`.
///
/// On failure, including a panic during construction, exactly one ERROR
/// trace line is written to `out` and `None` is returned. On success
/// nothing is written.
pub fn get_source<W: Write>(args: &[String], out: &mut W) -> Option<SourceS3> {
    let built = panic::catch_unwind(AssertUnwindSafe(|| build_source(args)))
        .unwrap_or_else(|payload| Err(panic_error(payload.as_ref())));

    match built {
        Ok(source) => Some(source),
        Err(err) => {
            write_startup_error(out, &err);
            None
        }
    }
}

/// Hand the connector to `launcher` with the original arguments, or return
/// quietly after reporting a startup failure.
pub fn run<W, L>(args: &[String], out: &mut W, launcher: L) -> anyhow::Result<()>
where
    W: Write,
    L: FnOnce(SourceS3, &[String]) -> anyhow::Result<()>,
{
    match get_source(args, out) {
        Some(source) => launcher(source, args),
        None => Ok(()),
    }
}

fn build_source(args: &[String]) -> anyhow::Result<SourceS3> {
    let catalog_path = extract_catalog(args)?;
    let source = SourceS3::new(SourceS3StreamReader::new(), catalog_path.as_deref())?;
    Ok(source)
}

fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    anyhow::anyhow!("panicked while constructing the source: {reason}")
}

/// Error chain plus a backtrace. Falls back to the current stack when the
/// error did not capture one.
fn stack_trace(err: &anyhow::Error) -> String {
    let mut text = format!("{err:?}");
    if err.backtrace().status() != BacktraceStatus::Captured {
        text.push_str("\n\nStack backtrace:\n");
        text.push_str(&Backtrace::force_capture().to_string());
    }
    text
}

fn write_startup_error<W: Write>(out: &mut W, err: &anyhow::Error) {
    let trace = TraceMessage::error(
        now_millis(),
        ErrorTrace::new(STARTUP_ERROR_MESSAGE).with_stack_trace(stack_trace(err)),
    );
    if let Err(write_err) = Emitter::new(out).emit(&Message::trace(trace)) {
        eprintln!("failed to write startup error: {write_err}");
    }
}
