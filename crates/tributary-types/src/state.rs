//! Per-stream state checkpoints emitted during `read`.

use serde::{Deserialize, Serialize};

use crate::catalog::StreamDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    Stream,
}

/// Opaque state blob for a single stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    pub stream_descriptor: StreamDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_state: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub state_type: StateType,
    pub stream: StreamState,
}

impl StateMessage {
    #[must_use]
    pub fn stream(descriptor: StreamDescriptor, state: serde_json::Value) -> Self {
        Self {
            state_type: StateType::Stream,
            stream: StreamState {
                stream_descriptor: descriptor,
                stream_state: Some(state),
            },
        }
    }
}

/// Find the state blob for `name` in a list of stream states, as passed via `--state`.
#[must_use]
pub fn find_stream_state<'a>(states: &'a [StateMessage], name: &str) -> Option<&'a serde_json::Value> {
    states
        .iter()
        .find(|s| s.stream.stream_descriptor.name == name)
        .and_then(|s| s.stream.stream_state.as_ref())
}
