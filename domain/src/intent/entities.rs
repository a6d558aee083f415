//! Intent entities

use crate::conversation::Message;
use crate::tool::ToolSet;

/// One self-contained request carved out of a conversation.
///
/// The conversation ends with a single user turn holding the fragment; the
/// tool set is narrowed to the tools that fragment most likely needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub messages: Vec<Message>,
    pub tools: ToolSet,
    /// The request fragment, `None` when the whole conversation is the intent
    pub fragment: Option<String>,
}

impl Intent {
    /// The whole conversation with the full tool set.
    pub fn whole(messages: &[Message], tools: &ToolSet) -> Self {
        Self {
            messages: messages.to_vec(),
            tools: tools.clone(),
            fragment: None,
        }
    }

    /// Short label for logs and progress output.
    pub fn label(&self) -> &str {
        match &self.fragment {
            Some(fragment) => fragment,
            None => self
                .messages
                .iter()
                .rev()
                .find(|m| m.is_user())
                .map(|m| m.content.as_str())
                .unwrap_or(""),
        }
    }
}
