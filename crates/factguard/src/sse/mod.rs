//! Event-stream framing shared by the server and the client
//!
//! This module handles the line-level wire format:
//! - Encoding a [`StreamEvent`] as an `event:`/`data:` frame
//! - Reframing arbitrary upstream lines so the relayed stream stays valid
//! - Splitting a byte stream into lines and decoding lines back into events

mod decoder;
mod lines;

pub use decoder::{SseDecoder, SseMessage};
pub use lines::LineSplitter;

use serde::{Deserialize, Serialize};

/// Content type of every analysis stream response
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Out-of-band stop token some upstreams send as a data line
pub const DONE_SENTINEL: &str = "[DONE]";

/// Error discriminator carried by the terminal `error` event
pub const STREAM_FAILED: &str = "stream_failed";

/// Well-known event names of the analysis stream
pub mod event_type {
    pub const START: &str = "start";
    pub const PROGRESS: &str = "progress";
    pub const RESULT: &str = "result";
    pub const DONE: &str = "done";
    pub const ERROR: &str = "error";
    /// Name used when a frame carries data without an `event:` line
    pub const MESSAGE: &str = "message";
}

/// One named event of an analysis stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event_type: String,
    pub data: String,
}

impl StreamEvent {
    pub fn new(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: data.into(),
        }
    }

    /// The terminal failure event for a broken upstream stream
    pub fn stream_failed(details: &str) -> Self {
        let payload = serde_json::json!({
            "error": STREAM_FAILED,
            "details": details,
        });
        Self::new(event_type::ERROR, payload.to_string())
    }

    /// Whether this event ends the stream for a consumer
    pub fn is_terminal(&self) -> bool {
        self.event_type == event_type::DONE || self.event_type == event_type::ERROR
    }

    /// Encode as a complete frame, one `data:` line per data line
    ///
    /// ```
    /// # use factguard::sse::StreamEvent;
    /// let frame = StreamEvent::new("progress", "reading page").to_frame();
    /// assert_eq!(frame, "event: progress\ndata: reading page\n\n");
    /// ```
    pub fn to_frame(&self) -> String {
        let mut frame = format!("event: {}\n", self.event_type);
        for line in self.data.split('\n') {
            frame.push_str("data: ");
            frame.push_str(line.strip_suffix('\r').unwrap_or(line));
            frame.push('\n');
        }
        frame.push('\n');
        frame
    }
}

/// Whether an upstream line already carries an event-stream field we relay as-is
pub fn is_framed(line: &str) -> bool {
    line.starts_with("event:") || line.starts_with("data:")
}

/// Map one upstream line to the line written to the client
///
/// Blank lines stay blank, `event:`/`data:` lines pass through unchanged and
/// anything else is wrapped as `data: <line>`. The result is newline-terminated.
pub fn reframe_line(line: &str) -> String {
    if line.is_empty() || is_framed(line) {
        format!("{line}\n")
    } else {
        format!("data: {line}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reframe_blank_line() {
        assert_eq!(reframe_line(""), "\n");
    }

    #[test]
    fn test_reframe_framed_lines_pass_through() {
        assert_eq!(reframe_line("event: progress"), "event: progress\n");
        assert_eq!(reframe_line("data: {\"a\":1}"), "data: {\"a\":1}\n");
        assert_eq!(reframe_line("data:no-space"), "data:no-space\n");
        assert_eq!(reframe_line("event:"), "event:\n");
    }

    #[test]
    fn test_reframe_bare_line_is_wrapped() {
        assert_eq!(reframe_line("hello"), "data: hello\n");
        assert_eq!(reframe_line("{\"score\":8}"), "data: {\"score\":8}\n");
        // Only exact field prefixes count as framed
        assert_eq!(reframe_line(" data: x"), "data:  data: x\n");
        assert_eq!(reframe_line("Event: x"), "data: Event: x\n");
        assert_eq!(reframe_line(": comment"), "data: : comment\n");
    }

    #[test]
    fn test_reframe_whitespace_line_is_not_blank() {
        assert_eq!(reframe_line("   "), "data:    \n");
    }

    #[test]
    fn test_frame_single_line() {
        let event = StreamEvent::new("start", "🚀 go");
        assert_eq!(event.to_frame(), "event: start\ndata: 🚀 go\n\n");
    }

    #[test]
    fn test_frame_multi_line_data() {
        let event = StreamEvent::new("progress", "one\ntwo\r\nthree");
        assert_eq!(
            event.to_frame(),
            "event: progress\ndata: one\ndata: two\ndata: three\n\n"
        );
    }

    #[test]
    fn test_frame_empty_data() {
        let event = StreamEvent::new("done", "");
        assert_eq!(event.to_frame(), "event: done\ndata: \n\n");
    }

    #[test]
    fn test_stream_failed_payload() {
        let event = StreamEvent::stream_failed("connection refused");
        assert_eq!(event.event_type, "error");
        assert!(event.is_terminal());

        let payload: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["error"], "stream_failed");
        assert_eq!(payload["details"], "connection refused");
    }

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::new("done", "").is_terminal());
        assert!(!StreamEvent::new("progress", "").is_terminal());
        assert!(!StreamEvent::new("result", "{}").is_terminal());
    }
}
