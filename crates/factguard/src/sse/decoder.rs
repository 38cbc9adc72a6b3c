use super::{DONE_SENTINEL, StreamEvent, event_type};

/// Something a consumer acts on after feeding a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseMessage {
    /// A complete event (dispatched at the blank line ending its frame)
    Event(StreamEvent),
    /// A literal `data: [DONE]` line
    Done,
}

/// Incremental decoder turning event-stream lines into events
///
/// Follows the event-stream field rules closely enough for analysis
/// streams: `event:` names the frame, `data:` lines accumulate (joined with
/// `\n`), lines starting with `:` are comments, unknown fields are ignored
/// and a blank line dispatches the frame.
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_line(&mut self, line: &str) -> Option<SseMessage> {
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
            "event" => self.event = Some(value.to_string()),
            "data" => {
                if value.trim() == DONE_SENTINEL {
                    self.reset();
                    return Some(SseMessage::Done);
                }
                self.data.push(value.to_string());
            }
            _ => {}
        }
        None
    }

    /// Dispatch whatever frame is still pending when the stream ends
    pub fn finish(&mut self) -> Option<SseMessage> {
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        if self.event.is_none() && self.data.is_empty() {
            return None;
        }
        let event_type = self
            .event
            .take()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| event_type::MESSAGE.to_string());
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseMessage::Event(StreamEvent { event_type, data }))
    }

    fn reset(&mut self) {
        self.event = None;
        self.data.clear();
    }
}
