//! Trace messages: out-of-band diagnostics for the orchestrating runtime.
//!
//! An ERROR trace is how a connector reports a failure in a form the
//! platform can surface to an operator. Optional fields are omitted from
//! the JSON when absent rather than written as `null`.

use serde::{Deserialize, Serialize};

use crate::catalog::StreamDescriptor;

/// Kind of trace payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceType {
    Error,
    Estimate,
    StreamStatus,
}

/// Who is expected to fix an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    /// Bug or outage inside the connector or the remote system.
    SystemError,
    /// The user supplied an invalid configuration.
    ConfigError,
    /// Likely to succeed on retry.
    TransientError,
}

/// Error details carried by an ERROR trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTrace {
    /// Operator-facing message.
    pub message: String,
    /// Technical message meant for support staff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<FailureType>,
}

impl ErrorTrace {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            internal_message: None,
            stack_trace: None,
            failure_type: None,
        }
    }

    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    #[must_use]
    pub fn with_internal_message(mut self, internal_message: impl Into<String>) -> Self {
        self.internal_message = Some(internal_message.into());
        self
    }

    #[must_use]
    pub fn with_failure_type(mut self, failure_type: FailureType) -> Self {
        self.failure_type = Some(failure_type);
        self
    }
}

/// Lifecycle status of a stream during `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    Started,
    Running,
    Complete,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatusTrace {
    pub stream_descriptor: StreamDescriptor,
    pub status: StreamStatus,
}

/// A trace payload stamped with its emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMessage {
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    /// Milliseconds since the Unix epoch.
    pub emitted_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_status: Option<StreamStatusTrace>,
}

impl TraceMessage {
    #[must_use]
    pub fn error(emitted_at: i64, error: ErrorTrace) -> Self {
        Self {
            trace_type: TraceType::Error,
            emitted_at,
            error: Some(error),
            stream_status: None,
        }
    }

    #[must_use]
    pub fn stream_status(emitted_at: i64, stream: StreamDescriptor, status: StreamStatus) -> Self {
        Self {
            trace_type: TraceType::StreamStatus,
            emitted_at,
            error: None,
            stream_status: Some(StreamStatusTrace {
                stream_descriptor: stream,
                status,
            }),
        }
    }
}
