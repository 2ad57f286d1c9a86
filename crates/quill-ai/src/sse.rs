//! Incremental decoding of `data:`-line event streams.
//!
//! The decoder is a pure function from raw response bytes to completion
//! events, independent of the transport, so the line discipline can be
//! tested against literal byte sequences.

use crate::stream::StreamEvent;
use crate::types::StreamChunk;

/// Sentinel payload marking normal end of stream.
const DONE_MARKER: &str = "[DONE]";

/// Incremental decoder for a `data: <json-or-[DONE]>` line stream.
///
/// Feed it response bytes as they arrive; it buffers partial lines across
/// chunk boundaries and emits at most one terminal event. A single
/// malformed line never aborts the stream: it is skipped and decoding
/// continues with the next line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume a chunk of response bytes, returning the events it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buffer.extend_from_slice(bytes);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            // Lines are complete here, so lossy decoding cannot split a
            // multi-byte character.
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim_end_matches(['\n', '\r']);

            match self.decode_line(line) {
                Some(event) => {
                    let terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        self.finished = true;
                        break;
                    }
                }
                None => continue,
            }
        }

        events
    }

    /// Signal end of input. Emits `Completed` if no terminal event was seen;
    /// a stream that ends without the sentinel still completed normally.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(StreamEvent::Completed)
    }

    fn decode_line(&self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            return None;
        }

        // Anything without the data prefix is a comment or keep-alive.
        let payload = line.strip_prefix("data: ")?.trim();

        if payload == DONE_MARKER {
            return Some(StreamEvent::Completed);
        }

        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => chunk
                .delta_content()
                .map(|text| StreamEvent::Token { text }),
            Err(err) => {
                // One corrupt line must not kill an otherwise-good stream.
                tracing::debug!("skipping malformed stream line: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_line(payload: &str) -> String {
        format!("data: {}\n", payload)
    }

    fn token_line(text: &str) -> String {
        data_line(&format!(r#"{{"choices":[{{"delta":{{"content":"{}"}}}}]}}"#, text))
    }

    fn collect(input: &str) -> Vec<StreamEvent> {
        let mut decoder = SseDecoder::new();
        let mut events = decoder.feed(input.as_bytes());
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_tokens_then_done() {
        let input = format!("{}{}{}", token_line("Hel"), token_line("lo"), data_line("[DONE]"));
        let events = collect(&input);
        assert_eq!(
            events,
            vec![
                StreamEvent::token("Hel"),
                StreamEvent::token("lo"),
                StreamEvent::Completed,
            ]
        );
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let input = format!(
            "data: {{malformed json\n{}{}",
            token_line("ok"),
            data_line("[DONE]")
        );
        let events = collect(&input);
        assert_eq!(events, vec![StreamEvent::token("ok"), StreamEvent::Completed]);
    }

    #[test]
    fn test_blank_and_comment_lines_ignored() {
        let input = format!(
            "\n: keep-alive\nevent: message\n{}\n{}",
            token_line("hi"),
            data_line("[DONE]")
        );
        let events = collect(&input);
        assert_eq!(events, vec![StreamEvent::token("hi"), StreamEvent::Completed]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = format!(
            "{}\r\n{}\r\n",
            token_line("hi").trim_end(),
            data_line("[DONE]").trim_end()
        );
        let events = collect(&input);
        assert_eq!(events, vec![StreamEvent::token("hi"), StreamEvent::Completed]);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let full = token_line("hello");
        let (a, b) = full.split_at(9); // splits inside the "data: " payload
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(a.as_bytes()).is_empty());
        let events = decoder.feed(b.as_bytes());
        assert_eq!(events, vec![StreamEvent::token("hello")]);
    }

    #[test]
    fn test_prefix_split_across_chunks() {
        let full = token_line("x");
        let (a, b) = full.split_at(3); // splits inside "data: " itself
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(a.as_bytes()).is_empty());
        assert_eq!(decoder.feed(b.as_bytes()), vec![StreamEvent::token("x")]);
    }

    #[test]
    fn test_multibyte_content_split_across_chunks() {
        let full = token_line("héllo ✓");
        let bytes = full.as_bytes();
        let mut decoder = SseDecoder::new();
        let mut events = Vec::new();
        for chunk in bytes.chunks(7) {
            events.extend(decoder.feed(chunk));
        }
        assert_eq!(events, vec![StreamEvent::token("héllo ✓")]);
    }

    #[test]
    fn test_single_chunk_equals_byte_by_byte() {
        let input = format!("{}{}{}", token_line("a"), token_line("b"), data_line("[DONE]"));

        let whole = collect(&input);

        let mut decoder = SseDecoder::new();
        let mut split: Vec<StreamEvent> = Vec::new();
        for byte in input.as_bytes() {
            split.extend(decoder.feed(&[*byte]));
        }
        split.extend(decoder.finish());

        assert_eq!(whole, split);
    }

    #[test]
    fn test_end_without_done_completes() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(token_line("partial").as_bytes());
        assert_eq!(events, vec![StreamEvent::token("partial")]);
        assert_eq!(decoder.finish(), Some(StreamEvent::Completed));
    }

    #[test]
    fn test_nothing_after_terminal() {
        let mut decoder = SseDecoder::new();
        decoder.feed(data_line("[DONE]").as_bytes());
        assert!(decoder.is_finished());
        assert!(decoder.feed(token_line("late").as_bytes()).is_empty());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_done_marker_with_trailing_whitespace() {
        let events = collect("data: [DONE]  \n");
        assert_eq!(events, vec![StreamEvent::Completed]);
    }

    #[test]
    fn test_empty_choices_is_no_token() {
        let input = format!("{}{}", data_line(r#"{"choices":[]}"#), data_line("[DONE]"));
        assert_eq!(collect(&input), vec![StreamEvent::Completed]);
    }

    #[test]
    fn test_missing_content_is_no_token() {
        let input = format!(
            "{}{}",
            data_line(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            data_line("[DONE]")
        );
        assert_eq!(collect(&input), vec![StreamEvent::Completed]);
    }

    #[test]
    fn test_data_without_space_is_ignored() {
        // The endpoint always emits "data: " with a space; anything else is
        // treated as protocol noise.
        let input = format!("data:{}\n{}", r#"{"x":1}"#, data_line("[DONE]"));
        assert_eq!(collect(&input), vec![StreamEvent::Completed]);
    }
}
