//! Incremental `text/event-stream` decoding
//!
//! Network chunks may split an event anywhere, including in the middle of a
//! line or between `\r` and `\n`. The decoder keeps the partial line and the
//! fields of the event being assembled until a blank line dispatches it.

use serde::Deserialize;

/// One dispatched server-sent event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, `None` for the default `message` type
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// `id:` field
    pub id: Option<String>,
}

/// JSON payload carried in the `data` of outline stream events
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamMessage {
    /// Delta text produced by the model
    pub content: Option<String>,
    /// Set on the frame carrying the model's stop reason
    pub is_last_message: bool,
    /// Server-side failure (timeout, upstream error)
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct PendingEvent {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl PendingEvent {
    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty() && self.id.is_none()
    }
}

/// Stateful decoder for a `text/event-stream` body
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Incomplete trailing line
    line: String,
    /// Fields of the event being assembled
    pending: PendingEvent,
    /// Last chunk ended on `\r`; a leading `\n` in the next chunk belongs to it
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one network chunk
    ///
    /// # Returns
    /// * `Vec<SseEvent>` - Events completed by this chunk, in stream order
    pub fn push(&mut self, chunk: &str) -> Vec<SseEvent> {
        let mut events = Vec::new();
        let mut rest = chunk;

        if self.after_cr {
            rest = rest.strip_prefix('\n').unwrap_or(rest);
            self.after_cr = false;
        }

        while let Some(pos) = rest.find(['\r', '\n']) {
            self.line.push_str(&rest[..pos]);
            let terminator = rest.as_bytes()[pos];
            rest = &rest[pos + 1..];
            if terminator == b'\r' {
                match rest.strip_prefix('\n') {
                    Some(stripped) => rest = stripped,
                    None if rest.is_empty() => self.after_cr = true,
                    None => {}
                }
            }

            let line = std::mem::take(&mut self.line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.line.push_str(rest);

        events
    }

    /// Flush an event left without its terminating blank line at end of stream
    pub fn finish(&mut self) -> Option<SseEvent> {
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            self.process_line(&line);
        }
        self.after_cr = false;
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.pending.data.push(value.to_string()),
            "event" => self.pending.event = Some(value.to_string()),
            "id" => self.pending.id = Some(value.to_string()),
            "retry" => {}
            other => log::debug!("Ignoring unknown SSE field '{}'", other),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.pending.is_empty() {
            return None;
        }
        let pending = std::mem::take(&mut self.pending);
        Some(SseEvent {
            event: pending.event,
            data: pending.data.join("\n"),
            id: pending.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(events: &[SseEvent]) -> Vec<&str> {
        events.iter().map(|e| e.data.as_str()).collect()
    }

    #[test]
    fn test_single_event() {
        let mut d = SseDecoder::new();
        let events = d.push("data: {\"content\":\"# T\"}\n\n");
        assert_eq!(data(&events), vec!["{\"content\":\"# T\"}"]);
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut d = SseDecoder::new();
        assert!(d.push("da").is_empty());
        assert!(d.push("ta: hel").is_empty());
        assert!(d.push("lo\n").is_empty());
        let events = d.push("\ndata: next\n\n");
        assert_eq!(data(&events), vec!["hello", "next"]);
    }

    #[test]
    fn test_crlf_split_between_cr_and_lf() {
        let mut d = SseDecoder::new();
        assert!(d.push("data: a\r").is_empty());
        let events = d.push("\n\r");
        assert_eq!(data(&events), vec!["a"]);
        let events = d.push("\ndata: b\r\n\r\n");
        assert_eq!(data(&events), vec!["b"]);
    }

    #[test]
    fn test_multiline_data_and_fields() {
        let mut d = SseDecoder::new();
        let events = d.push(": keep-alive\nevent: FatalError\nid: 7\ndata: one\ndata:two\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("FatalError"));
        assert_eq!(events[0].id.as_deref(), Some("7"));
        assert_eq!(events[0].data, "one\ntwo");
    }

    #[test]
    fn test_comment_only_block_dispatches_nothing() {
        let mut d = SseDecoder::new();
        assert!(d.push(": ping\n\n\n\n").is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut d = SseDecoder::new();
        assert!(d.push("data: tail").is_empty());
        let event = d.finish().unwrap();
        assert_eq!(event.data, "tail");
        assert!(d.finish().is_none());
    }

    #[test]
    fn test_stream_message_payloads() {
        let msg: StreamMessage =
            serde_json::from_str(r###"{"content":"## A\n","isLastMessage":false}"###).unwrap();
        assert_eq!(msg.content.as_deref(), Some("## A\n"));
        assert!(!msg.is_last_message);

        let msg: StreamMessage = serde_json::from_str(r#"{"error":"timeout"}"#).unwrap();
        assert_eq!(msg.error.as_deref(), Some("timeout"));
        assert_eq!(msg.content, None);
    }
}
