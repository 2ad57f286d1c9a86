//! Conversation state: the append-only message transcript.

use quill_ai::Message;

/// The conversation transcript and turn status.
///
/// Messages are append-only; insertion order is chronological turn order.
#[derive(Debug, Default)]
pub struct Conversation {
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Last turn's failure, if any (status display only, not transcript)
    pub last_error: Option<String>,
}

impl Conversation {
    /// Append a message to the transcript
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The trailing `min(limit, len)` messages, tail-aligned.
    ///
    /// Recomputed per request; this is the slice sent to the endpoint.
    pub fn context_window(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Number of messages in the transcript
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all messages and any recorded error
    pub fn clear(&mut self) {
        self.messages.clear();
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation_with(n: usize) -> Conversation {
        let mut conv = Conversation::default();
        for i in 0..n {
            conv.push(Message::user(format!("message {}", i)));
        }
        conv
    }

    #[test]
    fn test_window_shorter_than_limit() {
        let conv = conversation_with(3);
        assert_eq!(conv.context_window(10).len(), 3);
    }

    #[test]
    fn test_window_clamped_to_limit() {
        let conv = conversation_with(25);
        let window = conv.context_window(10);
        assert_eq!(window.len(), 10);
        // Tail-aligned: the newest messages survive.
        assert_eq!(window[0].content, "message 15");
        assert_eq!(window[9].content, "message 24");
    }

    #[test]
    fn test_window_invariant_across_sizes() {
        for n in 0..30 {
            let conv = conversation_with(n);
            assert_eq!(conv.context_window(10).len(), n.min(10));
        }
    }

    #[test]
    fn test_window_of_empty_conversation() {
        let conv = Conversation::default();
        assert!(conv.context_window(10).is_empty());
    }

    #[test]
    fn test_clear_resets_error() {
        let mut conv = conversation_with(2);
        conv.last_error = Some("boom".into());
        conv.clear();
        assert!(conv.is_empty());
        assert!(conv.last_error.is_none());
    }
}
