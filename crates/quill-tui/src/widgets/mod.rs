//! Custom widgets for the chat TUI

pub mod input_box;
pub mod markdown;
pub mod message_list;
pub mod selector;
pub mod spinner;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, ChatRole, MessageList};
pub use selector::{Selector, SelectorItem, SelectorState};
pub use spinner::Spinner;
