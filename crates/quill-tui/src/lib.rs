//! quill-tui: Terminal UI components
//!
//! Widgets and terminal plumbing for the chat interface, built on ratatui
//! and crossterm.

pub mod input;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use terminal::Tui;
pub use theme::Theme;
