//! Intent segmentation and per-intent tool narrowing
//!
//! The last user turn is split on conjunctions and commas. Every fragment
//! becomes its own [`Intent`] with the `top_k` tools whose vocabulary
//! overlaps it most.

use super::entities::Intent;
use super::lexicon::{expand_synonyms, lemmas};
use crate::conversation::Message;
use crate::core::error::DomainError;
use crate::tool::ToolSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DEFAULT_SPLITTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:and|then)\b|,").expect("invalid default split regex"));

/// Segmenter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Tools kept per intent
    pub top_k: usize,
    /// Whole words (case-insensitive) that separate commands
    pub split_words: Vec<String>,
    pub split_on_commas: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            split_words: vec!["and".to_string(), "then".to_string()],
            split_on_commas: true,
        }
    }
}

/// Splits a conversation into intents.
///
/// # Example
///
/// ```
/// use fncall_domain::conversation::Message;
/// use fncall_domain::intent::{IntentSegmenter, SegmenterConfig};
/// use fncall_domain::tool::{ToolSchema, ToolSet};
///
/// let tools = ToolSet::new(vec![
///     ToolSchema::new("get_weather", "Get current weather for a location"),
///     ToolSchema::new("set_alarm", "Set an alarm for a given time"),
/// ]).unwrap();
///
/// let segmenter = IntentSegmenter::new(SegmenterConfig::default()).unwrap();
/// let intents = segmenter.segment(
///     &[Message::user("What's the weather in Paris and wake me up at 7")],
///     &tools,
/// );
///
/// assert_eq!(intents.len(), 2);
/// assert_eq!(intents[0].tools.names().next(), Some("get_weather"));
/// assert_eq!(intents[1].tools.names().next(), Some("set_alarm"));
/// ```
#[derive(Debug, Clone)]
pub struct IntentSegmenter {
    config: SegmenterConfig,
    splitter: Option<Regex>,
}

impl Default for IntentSegmenter {
    fn default() -> Self {
        Self {
            config: SegmenterConfig::default(),
            splitter: Some(DEFAULT_SPLITTER.clone()),
        }
    }
}

impl IntentSegmenter {
    pub fn new(config: SegmenterConfig) -> Result<Self, DomainError> {
        let mut alternatives = Vec::new();

        let words: Vec<String> = config
            .split_words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();
        if !words.is_empty() {
            alternatives.push(format!(r"\b(?:{})\b", words.join("|")));
        }
        if config.split_on_commas {
            alternatives.push(",".to_string());
        }

        let splitter = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!("(?i){}", alternatives.join("|"));
            Some(Regex::new(&pattern).map_err(|e| DomainError::InvalidSplitPattern(e.to_string()))?)
        };

        Ok(Self { config, splitter })
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Non-empty, trimmed command fragments of `text`.
    pub fn split(&self, text: &str) -> Vec<String> {
        let parts: Vec<&str> = match &self.splitter {
            Some(splitter) => splitter.split(text).collect(),
            None => vec![text],
        };
        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The `top_k` tools scoring highest against `fragment`, ties kept in
    /// tool-set order.
    pub fn rank_tools(&self, fragment: &str, tools: &ToolSet) -> ToolSet {
        let query = expand_synonyms(&lemmas(fragment));

        let mut scored: Vec<(usize, usize)> = tools
            .iter()
            .enumerate()
            .map(|(i, tool)| {
                let tool_lemmas = lemmas(&tool.searchable_text());
                (query.intersection(&tool_lemmas).count(), i)
            })
            .collect();
        // stable: equal scores keep declaration order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let indices: Vec<usize> = scored
            .into_iter()
            .take(self.config.top_k)
            .map(|(_, i)| i)
            .collect();
        tools.select(&indices)
    }

    /// Split the last user turn into intents.
    ///
    /// Each intent carries every non-user turn, then the earlier user turns,
    /// then its fragment as the final user turn. Without a user turn, or when
    /// nothing is left after splitting, the whole conversation is one intent
    /// with the full tool set.
    pub fn segment(&self, messages: &[Message], tools: &ToolSet) -> Vec<Intent> {
        let user_turns: Vec<&Message> = messages.iter().filter(|m| m.is_user()).collect();
        let Some((last_user, earlier_users)) = user_turns.split_last() else {
            return vec![Intent::whole(messages, tools)];
        };

        let fragments = self.split(&last_user.content);
        if fragments.is_empty() {
            return vec![Intent::whole(messages, tools)];
        }

        let base: Vec<Message> = messages
            .iter()
            .filter(|m| !m.is_user())
            .chain(earlier_users.iter().copied())
            .cloned()
            .collect();

        fragments
            .into_iter()
            .map(|fragment| {
                let mut intent_messages = base.clone();
                intent_messages.push(Message::user(fragment.clone()));
                Intent {
                    messages: intent_messages,
                    tools: self.rank_tools(&fragment, tools),
                    fragment: Some(fragment),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::tool::{ToolParameter, ToolSchema};

    fn segmenter() -> IntentSegmenter {
        IntentSegmenter::new(SegmenterConfig::default()).unwrap()
    }

    fn tools() -> ToolSet {
        ToolSet::new(vec![
            ToolSchema::new("get_weather", "Get current weather for a location")
                .with_parameter(ToolParameter::new("location", "string", true).with_description("City name"))
                .unwrap(),
            ToolSchema::new("set_alarm", "Set an alarm for a given time")
                .with_parameter(ToolParameter::new("hour", "integer", true).with_description("Hour to set the alarm for"))
                .unwrap(),
            ToolSchema::new("send_message", "Send a message to a contact")
                .with_parameter(ToolParameter::new("recipient", "string", true).with_description("Name of the person to send the message to"))
                .unwrap(),
            ToolSchema::new("play_music", "Play a song or playlist")
                .with_parameter(ToolParameter::new("song", "string", true).with_description("Song or playlist name"))
                .unwrap(),
            ToolSchema::new("search_contacts", "Search for a contact by name")
                .with_parameter(ToolParameter::new("query", "string", true).with_description("Name to search for"))
                .unwrap(),
        ])
        .unwrap()
    }

    fn names(set: &ToolSet) -> Vec<&str> {
        set.names().collect()
    }

    #[test]
    fn test_two_commands_two_intents() {
        let tools = ToolSet::new(vec![
            ToolSchema::new("search_invoices", "Find invoices for a customer"),
            ToolSchema::new("create_ticket", "Open a support ticket"),
        ])
        .unwrap();
        let intents = segmenter().segment(
            &[Message::user("find unpaid invoices for ACME and open a ticket about it")],
            &tools,
        );

        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].fragment.as_deref(), Some("find unpaid invoices for ACME"));
        assert_eq!(intents[1].fragment.as_deref(), Some("open a ticket about it"));
    }

    #[test]
    fn test_non_ascii_words_segment() {
        let intents = segmenter().segment(&[Message::user("play a丸ing and check weather")], &tools());

        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].fragment.as_deref(), Some("play a丸ing"));
        assert_eq!(intents[1].tools.names().next(), Some("get_weather"));
    }

    #[test]
    fn test_default_matches_default_config() {
        let text = "play jazz, then text Bob and call mom";
        assert_eq!(IntentSegmenter::default().split(text), segmenter().split(text));
    }

    #[test]
    fn test_split_words_and_commas() {
        let parts = segmenter().split("Text Bob, then play jazz AND check weather");
        assert_eq!(parts, ["Text Bob", "play jazz", "check weather"]);
    }

    #[test]
    fn test_split_respects_word_boundaries() {
        let parts = segmenter().split("play Band of Horses thenceforth");
        assert_eq!(parts, ["play Band of Horses thenceforth"]);
    }

    #[test]
    fn test_split_discards_empty_fragments() {
        assert!(segmenter().split(" , and ,then ").is_empty());
    }

    #[test]
    fn test_no_split_configured() {
        let segmenter = IntentSegmenter::new(SegmenterConfig {
            split_words: Vec::new(),
            split_on_commas: false,
            ..SegmenterConfig::default()
        })
        .unwrap();
        assert_eq!(segmenter.split("a, b and c"), ["a, b and c"]);
    }

    #[test]
    fn test_rank_tools_by_overlap() {
        let tools = tools();
        let s = segmenter();

        assert_eq!(names(&s.rank_tools("what is the weather in Paris", &tools))[0], "get_weather");
        assert_eq!(names(&s.rank_tools("wake me up at 6", &tools))[0], "set_alarm");
        assert_eq!(names(&s.rank_tools("text Alice", &tools))[0], "send_message");
        assert_eq!(names(&s.rank_tools("play some music", &tools))[0], "play_music");
        assert_eq!(names(&s.rank_tools("look up Tom", &tools))[0], "search_contacts");
    }

    #[test]
    fn test_rank_ties_keep_tool_order() {
        let ranked = segmenter().rank_tools("zzz qqq", &tools());
        assert_eq!(names(&ranked), ["get_weather", "set_alarm"]);
    }

    #[test]
    fn test_rank_respects_top_k() {
        let segmenter = IntentSegmenter::new(SegmenterConfig {
            top_k: 4,
            ..SegmenterConfig::default()
        })
        .unwrap();
        assert_eq!(segmenter.rank_tools("anything", &tools()).len(), 4);

        let small = ToolSet::new(vec![ToolSchema::new("only", "")]).unwrap();
        assert_eq!(segmenter.rank_tools("anything", &small).len(), 1);
    }

    #[test]
    fn test_intent_conversation_layout() {
        let messages = vec![
            Message::system("sys"),
            Message::user("earlier"),
            Message::assistant("ok"),
            Message::user("play music and text Bob"),
        ];
        let intents = segmenter().segment(&messages, &tools());

        assert_eq!(intents.len(), 2);
        let roles: Vec<Role> = intents[1].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::Assistant, Role::User, Role::User]);
        assert_eq!(intents[1].messages[2].content, "earlier");
        assert_eq!(intents[1].messages[3].content, "text Bob");
    }

    #[test]
    fn test_no_user_turn_is_whole_conversation() {
        let messages = vec![Message::system("sys")];
        let intents = segmenter().segment(&messages, &tools());

        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].messages, messages);
        assert_eq!(intents[0].tools.len(), 5);
        assert!(intents[0].fragment.is_none());
    }

    #[test]
    fn test_blank_request_is_whole_conversation() {
        let messages = vec![Message::user(" , ")];
        let intents = segmenter().segment(&messages, &tools());

        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].tools, tools());
    }

    #[test]
    fn test_single_command_still_narrows_tools() {
        let intents = segmenter().segment(&[Message::user("set an alarm for 7")], &tools());
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].tools.len(), 2);
        assert_eq!(names(&intents[0].tools)[0], "set_alarm");
    }
}
