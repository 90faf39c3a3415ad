//! Line-delimited protocol output.

use std::io::{self, Write};

use tributary_types::{
    ConnectorError, ErrorTrace, Message, RecordMessage, StateMessage, StreamDescriptor,
    StreamStatus, TraceMessage,
};

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Writes protocol messages, one JSON object per line, flushing after each.
#[derive(Debug)]
pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Serialize and write a single message.
    pub fn emit(&mut self, message: &Message) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    /// Emit a record for `stream` stamped with the current time.
    pub fn record(
        &mut self,
        stream: &str,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), ConnectorError> {
        let record = RecordMessage {
            stream: stream.to_string(),
            data,
            emitted_at: now_millis(),
            namespace: None,
        };
        self.emit(&Message::record(record)).map_err(emit_failed)
    }

    pub fn state(&mut self, state: StateMessage) -> Result<(), ConnectorError> {
        self.emit(&Message::state(state)).map_err(emit_failed)
    }

    pub fn stream_status(
        &mut self,
        stream: &str,
        status: StreamStatus,
    ) -> Result<(), ConnectorError> {
        let trace = TraceMessage::stream_status(now_millis(), StreamDescriptor::new(stream), status);
        self.emit(&Message::trace(trace)).map_err(emit_failed)
    }

    pub fn error_trace(&mut self, error: ErrorTrace) -> io::Result<()> {
        self.emit(&Message::trace(TraceMessage::error(now_millis(), error)))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn emit_failed(e: io::Error) -> ConnectorError {
    ConnectorError::internal("EMIT_FAILED", format!("failed to write message: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tributary_types::{LogLevel, MessageType};

    fn lines(buf: &[u8]) -> Vec<Message> {
        std::str::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn each_message_is_one_line() {
        let mut emitter = Emitter::new(Vec::new());
        emitter.emit(&Message::log(LogLevel::Info, "a\nb")).unwrap();
        emitter.stream_status("users", StreamStatus::Started).unwrap();
        let out = emitter.into_inner();
        let msgs = lines(&out);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].log.as_ref().unwrap().message, "a\nb");
        assert_eq!(msgs[1].message_type, MessageType::Trace);
    }

    #[test]
    fn record_is_stamped_now() {
        let before = now_millis();
        let mut emitter = Emitter::new(Vec::new());
        let mut data = serde_json::Map::new();
        data.insert("file_uri".into(), "s3://raw/a.csv".into());
        emitter.record("files", data).unwrap();
        let msgs = lines(&emitter.into_inner());
        let record = msgs[0].record.as_ref().unwrap();
        assert_eq!(record.stream, "files");
        assert!(record.emitted_at >= before);
        assert!(record.emitted_at <= now_millis());
    }
}
