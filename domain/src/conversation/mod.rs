//! Conversation domain
//!
//! Ordered (role, content) turns as sent to a generation engine.

pub mod entities;

pub use entities::{Message, Role, with_system_prompt};
