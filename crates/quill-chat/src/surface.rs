//! The presentation surface contract.

/// Rendering operations the controller invokes.
///
/// Implementations render however they like (markdown, plain text); the
/// controller only requires that all four operations are called from its
/// single update loop and do not block indefinitely.
pub trait PresentationSurface {
    /// Show a submitted user message.
    fn render_user_message(&mut self, text: &str);

    /// Open a new, empty assistant message to stream into.
    fn begin_assistant_message(&mut self);

    /// Append a text fragment to the open assistant message. Called once
    /// per delta; the surface re-renders the accumulated content each time.
    fn append_assistant_delta(&mut self, delta: &str);

    /// Apply a new font scale.
    fn set_font_scale(&mut self, size: u16);
}
