use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The agent CLI that produced a session file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Claude,
    Codex,
    Gemini,
    Unknown,
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentType::Claude => "claude",
            AgentType::Codex => "codex",
            AgentType::Gemini => "gemini",
            AgentType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(AgentType::Claude),
            "codex" => Ok(AgentType::Codex),
            "gemini" => Ok(AgentType::Gemini),
            "unknown" => Ok(AgentType::Unknown),
            other => Err(format!("unknown agent type: {other}")),
        }
    }
}

/// Normalized role of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    User,
    Assistant,
    System,
    Unknown,
}

impl EntryKind {
    /// Map a message role string to the normalized kind.
    pub fn from_role(role: &str) -> Self {
        match role {
            "user" => EntryKind::User,
            "assistant" => EntryKind::Assistant,
            "system" => EntryKind::System,
            _ => EntryKind::Unknown,
        }
    }
}

/// One typed unit inside a message.
///
/// Closed union: consumers match exhaustively, with [`ContentBlock::Unrecognized`]
/// retaining the raw JSON of any block kind the engine does not understand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: ToolResultContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    Unrecognized {
        raw: Value,
    },
}

impl ContentBlock {
    /// Convert one raw Anthropic-shaped content block.
    ///
    /// Anything without a recognized `type` tag (or with malformed fields)
    /// becomes [`ContentBlock::Unrecognized`] so the raw JSON survives for
    /// diagnostics.
    pub fn from_raw(raw: &Value) -> ContentBlock {
        let block_type = raw.get("type").and_then(Value::as_str).unwrap_or("");
        match block_type {
            "text" => {
                if let Some(text) = raw.get("text").and_then(Value::as_str) {
                    return ContentBlock::Text { text: text.to_string() };
                }
            }
            "thinking" => {
                if let Some(text) = raw.get("thinking").and_then(Value::as_str) {
                    return ContentBlock::Thinking {
                        text: text.to_string(),
                        signature: raw
                            .get("signature")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    };
                }
            }
            "tool_use" => {
                if let (Some(id), Some(name)) = (
                    raw.get("id").and_then(Value::as_str),
                    raw.get("name").and_then(Value::as_str),
                ) {
                    return ContentBlock::ToolUse {
                        id: id.to_string(),
                        name: name.to_string(),
                        input: raw.get("input").cloned().unwrap_or(Value::Null),
                    };
                }
            }
            "tool_result" => {
                if let Some(tool_use_id) = raw.get("tool_use_id").and_then(Value::as_str) {
                    let content = match raw.get("content") {
                        Some(Value::String(s)) => ToolResultContent::Text(s.clone()),
                        Some(Value::Array(items)) => ToolResultContent::Blocks(
                            items.iter().map(ContentBlock::from_raw).collect(),
                        ),
                        _ => ToolResultContent::Text(String::new()),
                    };
                    return ContentBlock::ToolResult {
                        tool_use_id: tool_use_id.to_string(),
                        content,
                        is_error: raw.get("is_error").and_then(Value::as_bool),
                    };
                }
            }
            _ => {}
        }
        ContentBlock::Unrecognized { raw: raw.clone() }
    }
}

/// The content carried by a tool result: either plain text or nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl ToolResultContent {
    /// Flatten to display text. Nested blocks contribute their text parts,
    /// joined by newlines; non-text blocks are skipped.
    pub fn flatten(&self) -> String {
        match self {
            ToolResultContent::Text(text) => text.clone(),
            ToolResultContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A message carried by an entry: a role plus ordered content blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// One normalized log record.
///
/// Only constructible from a raw record that has both an id and a parseable
/// timestamp; parsers drop records failing that contract instead of
/// defaulting the fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Agent-specific payload retained for extraction passes that need
    /// fields outside the normalized shape.
    #[serde(skip)]
    pub raw: Value,
}

/// A tool result stored in the [`ToolResultIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedToolResult {
    pub content: ToolResultContent,
    pub is_error: Option<bool>,
}

/// Mapping from `ToolUse.id` to its matching result, built once per session.
/// Results may appear in a later entry than their corresponding call.
pub type ToolResultIndex = HashMap<String, IndexedToolResult>;
