//! The top-level protocol envelope.
//!
//! Every line a connector writes to stdout is one [`Message`]: a `type`
//! tag plus exactly one populated payload field matching it.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::state::StateMessage;
use crate::trace::TraceMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Record,
    State,
    Log,
    Spec,
    ConnectionStatus,
    Catalog,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// Self-description returned by `spec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// JSON schema of the connector's configuration.
    pub connection_specification: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Succeeded,
    Failed,
}

/// Outcome of `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectionStatus {
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            status: Status::Succeeded,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    pub stream: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Milliseconds since the Unix epoch.
    pub emitted_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// One line of connector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ConnectorSpecification>,
    #[serde(
        default,
        rename = "connectionStatus",
        skip_serializing_if = "Option::is_none"
    )]
    pub connection_status: Option<ConnectionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Catalog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceMessage>,
}

impl Message {
    fn empty(message_type: MessageType) -> Self {
        Self {
            message_type,
            log: None,
            spec: None,
            connection_status: None,
            catalog: None,
            record: None,
            state: None,
            trace: None,
        }
    }

    #[must_use]
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            log: Some(LogMessage {
                level,
                message: message.into(),
                stack_trace: None,
            }),
            ..Self::empty(MessageType::Log)
        }
    }

    #[must_use]
    pub fn spec(spec: ConnectorSpecification) -> Self {
        Self {
            spec: Some(spec),
            ..Self::empty(MessageType::Spec)
        }
    }

    #[must_use]
    pub fn connection_status(status: ConnectionStatus) -> Self {
        Self {
            connection_status: Some(status),
            ..Self::empty(MessageType::ConnectionStatus)
        }
    }

    #[must_use]
    pub fn catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Some(catalog),
            ..Self::empty(MessageType::Catalog)
        }
    }

    #[must_use]
    pub fn record(record: RecordMessage) -> Self {
        Self {
            record: Some(record),
            ..Self::empty(MessageType::Record)
        }
    }

    #[must_use]
    pub fn state(state: StateMessage) -> Self {
        Self {
            state: Some(state),
            ..Self::empty(MessageType::State)
        }
    }

    #[must_use]
    pub fn trace(trace: TraceMessage) -> Self {
        Self {
            trace: Some(trace),
            ..Self::empty(MessageType::Trace)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::ErrorTrace;
    use serde_json::json;

    #[test]
    fn trace_message_wire_shape() {
        let msg = Message::trace(TraceMessage::error(
            42,
            ErrorTrace::new("failed").with_stack_trace("trace"),
        ));
        let line = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            line,
            r#"{"type":"TRACE","trace":{"type":"ERROR","emitted_at":42,"error":{"message":"failed","stack_trace":"trace"}}}"#
        );
    }

    #[test]
    fn connection_status_uses_camel_case_key() {
        let msg = Message::connection_status(ConnectionStatus::failed("no bucket"));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "CONNECTION_STATUS");
        assert_eq!(json["connectionStatus"]["status"], "FAILED");
        assert_eq!(json["connectionStatus"]["message"], "no bucket");
    }

    #[test]
    fn spec_uses_camel_case_fields() {
        let msg = Message::spec(ConnectorSpecification {
            documentation_url: Some("https://example.com/s3".into()),
            connection_specification: json!({"type": "object"}),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["spec"]["documentationUrl"], "https://example.com/s3");
        assert_eq!(json["spec"]["connectionSpecification"]["type"], "object");
    }

    #[test]
    fn log_message_parses_back() {
        let line = r#"{"type":"LOG","log":{"level":"WARN","message":"slow listing"}}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        assert_eq!(msg, Message::log(LogLevel::Warn, "slow listing"));
    }
}
