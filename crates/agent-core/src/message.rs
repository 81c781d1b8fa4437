//! Conversation Messages
//!
//! The request-scoped transcript shared by the orchestration loop. Turns are
//! only ever appended; nothing in this module hands out mutable access to a
//! turn once it has been pushed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Role of a turn author
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input, including tool results fed back to the model
    User,
    /// Model reply
    Assistant,
}

/// Named arguments of a tool request
pub type ToolInput = serde_json::Map<String, serde_json::Value>;

/// A structured call the model wants executed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Unique within the emitting turn
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: ToolInput,
}

/// The serialized outcome of a prior tool request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    pub tool_request_id: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

/// One unit of a turn's payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolRequest(ToolRequest),
    ToolResult(ToolResultBlock),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_request(
        id: impl Into<String>,
        name: impl Into<String>,
        input: ToolInput,
    ) -> Self {
        Self::ToolRequest(ToolRequest {
            id: id.into(),
            name: name.into(),
            input,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub const fn as_tool_request(&self) -> Option<&ToolRequest> {
        match self {
            Self::ToolRequest(req) => Some(req),
            _ => None,
        }
    }
}

/// Turn payload: the initial seed is plain text, everything else is blocks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One role-tagged entry in the transcript
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    /// All tool requests in this turn, in emitted order
    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        match &self.content {
            TurnContent::Text(_) => Vec::new(),
            TurnContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::as_tool_request)
                .collect(),
        }
    }

    /// Text blocks joined by newlines, in original order
    pub fn final_text(&self) -> String {
        match &self.content {
            TurnContent::Text(text) => text.clone(),
            TurnContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::as_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Append-only conversation state for a single request
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Seed a conversation with the caller's text
    pub fn seeded(system: Option<String>, input: impl Into<String>) -> Self {
        let mut conv = Self {
            system,
            turns: Vec::new(),
        };
        conv.push_user_text(input);
        conv
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn push_user_text(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        });
    }

    /// Append a model reply
    pub fn push_assistant(&mut self, blocks: Vec<ContentBlock>) -> &Turn {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        });
        &self.turns[self.turns.len() - 1]
    }

    /// Append the user turn answering the previous assistant turn's requests.
    ///
    /// Every request must receive exactly one result; order is free.
    pub fn push_tool_results(&mut self, results: Vec<ToolResultBlock>) -> Result<()> {
        let previous = self
            .turns
            .last()
            .filter(|t| t.role == Role::Assistant)
            .ok_or_else(|| {
                AgentError::Protocol("tool results must follow an assistant turn".into())
            })?;

        let expected: HashSet<&str> = previous
            .tool_requests()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        if expected.is_empty() {
            return Err(AgentError::Protocol(
                "previous assistant turn requested no tools".into(),
            ));
        }

        let mut seen = HashSet::new();
        for result in &results {
            let id = result.tool_request_id.as_str();
            if !expected.contains(id) {
                return Err(AgentError::Protocol(format!(
                    "tool result references unknown request id '{id}'"
                )));
            }
            if !seen.insert(id) {
                return Err(AgentError::Protocol(format!(
                    "duplicate tool result for request id '{id}'"
                )));
            }
        }
        if seen.len() != expected.len() {
            return Err(AgentError::Protocol(format!(
                "{} tool request(s) left without a result",
                expected.len() - seen.len()
            )));
        }

        self.turns.push(Turn {
            role: Role::User,
            content: TurnContent::Blocks(
                results.into_iter().map(ContentBlock::ToolResult).collect(),
            ),
        });
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> ToolResultBlock {
        ToolResultBlock {
            tool_request_id: id.into(),
            content: "{}".into(),
            is_error: false,
        }
    }

    fn conversation_with_requests(ids: &[&str]) -> Conversation {
        let mut conv = Conversation::seeded(None, "weather in Paris");
        let blocks = ids
            .iter()
            .map(|id| ContentBlock::tool_request(*id, "get_weather", ToolInput::new()))
            .collect();
        conv.push_assistant(blocks);
        conv
    }

    #[test]
    fn test_final_text_joins_text_blocks_in_order() {
        let mut conv = Conversation::seeded(None, "hi");
        let turn = conv.push_assistant(vec![
            ContentBlock::text("first"),
            ContentBlock::text("second"),
        ]);
        assert_eq!(turn.final_text(), "first\nsecond");
        assert!(turn.tool_requests().is_empty());
    }

    #[test]
    fn test_tool_results_accepted_in_any_order() {
        let mut conv = conversation_with_requests(&["a", "b"]);
        conv.push_tool_results(vec![result("b"), result("a")]).unwrap();
        assert_eq!(conv.len(), 3);
        assert_eq!(conv.last().unwrap().role, Role::User);
    }

    #[test]
    fn test_missing_result_is_rejected() {
        let mut conv = conversation_with_requests(&["a", "b"]);
        let err = conv.push_tool_results(vec![result("a")]).unwrap_err();
        assert!(matches!(err, AgentError::Protocol(_)));
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_foreign_and_duplicate_ids_are_rejected() {
        let mut conv = conversation_with_requests(&["a"]);
        assert!(conv.push_tool_results(vec![result("zzz")]).is_err());
        assert!(conv.push_tool_results(vec![result("a"), result("a")]).is_err());
    }

    #[test]
    fn test_results_without_preceding_requests_are_rejected() {
        let mut conv = Conversation::seeded(None, "hi");
        assert!(conv.push_tool_results(vec![result("a")]).is_err());
    }

    #[test]
    fn test_content_block_tagging() {
        let block = ContentBlock::tool_request("t1", "get_coordinates", ToolInput::new());
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_request");
        assert_eq!(json["name"], "get_coordinates");
    }
}
