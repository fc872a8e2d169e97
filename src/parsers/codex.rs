use std::path::Path;

use serde_json::{Value, json};

use crate::models::{
    AgentType, ContentBlock, DiagnosticKind, Entry, EntryKind, ToolResultContent,
};
use crate::parsers::deserializers::parse_timestamp_value;
use crate::parsers::{AgentParser, ParseContext, detect_exit_code, message_from_blocks};

/// Parser for Codex session files: newline-delimited JSON under
/// `~/.codex/sessions/`, with records wrapped in `{type, payload}` and
/// OpenAI-style function calling. Tool results arrive as separate records
/// keyed by call id.
pub struct CodexParser;

const ERROR_TRIGGERS: [&str; 4] = ["error:", "exception:", "failed:", "traceback"];

/// Codex results carry no explicit error flag; sniff the content for the
/// fixed trigger substrings or a non-zero exit code.
pub(crate) fn looks_like_error(content: &str) -> bool {
    let lower = content.to_lowercase();
    ERROR_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
        || detect_exit_code(content).is_some_and(|code| code != 0)
}

/// OpenAI `function.arguments` is a JSON string. A call with unparseable
/// arguments is kept, not dropped; the original string survives under `_raw`.
fn parse_arguments(arguments: &str) -> Value {
    serde_json::from_str(arguments).unwrap_or_else(|_| json!({ "_raw": arguments }))
}

impl CodexParser {
    fn entry_from_blocks(
        &self,
        ctx: &mut ParseContext,
        timestamp: chrono::DateTime<chrono::Utc>,
        kind: EntryKind,
        role: &str,
        blocks: Vec<ContentBlock>,
        raw: &Value,
    ) -> Option<Entry> {
        let message = message_from_blocks(role, blocks)?;
        Some(Entry {
            id: format!("codex-{}", ctx.next_seq()),
            parent_id: None,
            timestamp,
            kind,
            message: Some(message),
            cwd: ctx.cwd.clone(),
            session_id: None,
            model: None,
            slug: None,
            raw: raw.clone(),
        })
    }

    /// Text blocks from an OpenAI message `content` value, which may be a
    /// plain string or an array of `{type, text}` parts.
    fn text_blocks(content: Option<&Value>) -> Vec<ContentBlock> {
        match content {
            Some(Value::String(text)) => vec![ContentBlock::Text { text: text.clone() }],
            Some(Value::Array(parts)) => parts
                .iter()
                .filter_map(|part| {
                    let part_type = part.get("type").and_then(Value::as_str)?;
                    if matches!(part_type, "text" | "input_text" | "output_text") {
                        let text = part.get("text").and_then(Value::as_str)?;
                        Some(ContentBlock::Text { text: text.to_string() })
                    } else {
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Tool-use blocks from an OpenAI `tool_calls` array.
    fn tool_call_blocks(&self, payload: &Value, ctx: &mut ParseContext) -> Vec<ContentBlock> {
        let Some(calls) = payload.get("tool_calls").and_then(Value::as_array) else {
            return Vec::new();
        };
        calls
            .iter()
            .filter_map(|call| {
                let function = call.get("function")?;
                let name = function.get("name").and_then(Value::as_str)?;
                let id = match call.get("id").and_then(Value::as_str) {
                    Some(id) => id.to_string(),
                    None => format!("call-{}", ctx.next_seq()),
                };
                ctx.remember_call(&id, name);
                let arguments =
                    function.get("arguments").and_then(Value::as_str).unwrap_or("{}");
                Some(ContentBlock::ToolUse {
                    id,
                    name: name.to_string(),
                    input: parse_arguments(arguments),
                })
            })
            .collect()
    }
}

impl AgentParser for CodexParser {
    fn agent(&self) -> AgentType {
        AgentType::Codex
    }

    fn parse_entry(&self, raw: &Value, ctx: &mut ParseContext) -> Option<Entry> {
        // Unwrap the {type, payload} envelope before inspecting the record
        let record_type = raw.get("type").and_then(Value::as_str).unwrap_or("");
        let payload = raw.get("payload").unwrap_or(raw);

        match record_type {
            "session_meta" => {
                if let Some(id) = payload.get("id").and_then(Value::as_str) {
                    ctx.session_id = Some(id.to_string());
                }
                if let Some(cwd) = payload.get("cwd").and_then(Value::as_str) {
                    ctx.cwd = Some(cwd.to_string());
                }
                return None;
            }
            "turn_context" => {
                if let Some(cwd) = payload.get("cwd").and_then(Value::as_str) {
                    ctx.cwd = Some(cwd.to_string());
                }
                if let Some(model) = payload.get("model").and_then(Value::as_str) {
                    ctx.model = Some(model.to_string());
                }
                return None;
            }
            _ => {}
        }

        let Some(timestamp) = raw.get("timestamp").and_then(parse_timestamp_value) else {
            ctx.warn(DiagnosticKind::MissingField, "record has no parseable timestamp");
            return None;
        };

        // Either an inner response_item type or a bare chat-format role
        let item_type = payload.get("type").and_then(Value::as_str).unwrap_or("");
        let role = payload.get("role").and_then(Value::as_str).unwrap_or("");

        match (item_type, role) {
            (_, "developer") | (_, "system") => None,
            (_, "tool") => {
                let Some(call_id) = payload.get("tool_call_id").and_then(Value::as_str) else {
                    ctx.warn(
                        DiagnosticKind::UnrecognizedShape,
                        "tool record has no tool_call_id",
                    );
                    return None;
                };
                let content = payload
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                if ctx.call_name(call_id).is_none() {
                    ctx.warn(
                        DiagnosticKind::UnrecognizedShape,
                        format!("result references unknown call id {call_id}"),
                    );
                }
                let is_error = looks_like_error(&content);
                let block = ContentBlock::ToolResult {
                    tool_use_id: call_id.to_string(),
                    content: ToolResultContent::Text(content),
                    is_error: Some(is_error),
                };
                self.entry_from_blocks(ctx, timestamp, EntryKind::User, "tool", vec![block], raw)
            }
            ("message", _) | ("", "user") | ("", "assistant") => {
                let kind = EntryKind::from_role(role);
                let mut blocks = Self::text_blocks(payload.get("content"));
                blocks.extend(self.tool_call_blocks(payload, ctx));

                // Legacy single function_call field, arguments as JSON string
                if let Some(function_call) = payload.get("function_call")
                    && let Some(name) = function_call.get("name").and_then(Value::as_str)
                {
                    let id = format!("call-{}", ctx.next_seq());
                    ctx.remember_call(&id, name);
                    let arguments =
                        function_call.get("arguments").and_then(Value::as_str).unwrap_or("{}");
                    blocks.push(ContentBlock::ToolUse {
                        id,
                        name: name.to_string(),
                        input: parse_arguments(arguments),
                    });
                }

                self.entry_from_blocks(ctx, timestamp, kind, role, blocks, raw)
            }
            ("function_call", _) => {
                let Some(name) = payload.get("name").and_then(Value::as_str) else {
                    ctx.warn(DiagnosticKind::MissingField, "function_call has no name");
                    return None;
                };
                let id = match payload.get("call_id").and_then(Value::as_str) {
                    Some(id) => id.to_string(),
                    None => format!("call-{}", ctx.next_seq()),
                };
                ctx.remember_call(&id, name);
                let arguments = payload.get("arguments").and_then(Value::as_str).unwrap_or("{}");
                let block = ContentBlock::ToolUse {
                    id,
                    name: name.to_string(),
                    input: parse_arguments(arguments),
                };
                self.entry_from_blocks(
                    ctx,
                    timestamp,
                    EntryKind::Assistant,
                    "assistant",
                    vec![block],
                    raw,
                )
            }
            ("function_call_output", _) => {
                let Some(call_id) = payload.get("call_id").and_then(Value::as_str) else {
                    ctx.warn(DiagnosticKind::MissingField, "function_call_output has no call_id");
                    return None;
                };
                let output =
                    payload.get("output").and_then(Value::as_str).unwrap_or("").to_string();
                if ctx.call_name(call_id).is_none() {
                    ctx.warn(
                        DiagnosticKind::UnrecognizedShape,
                        format!("result references unknown call id {call_id}"),
                    );
                }
                let is_error = looks_like_error(&output);
                let block = ContentBlock::ToolResult {
                    tool_use_id: call_id.to_string(),
                    content: ToolResultContent::Text(output),
                    is_error: Some(is_error),
                };
                self.entry_from_blocks(ctx, timestamp, EntryKind::User, "tool", vec![block], raw)
            }
            ("reasoning", _) => {
                let text = payload
                    .get("summary")
                    .and_then(Value::as_array)
                    .map(|summaries| {
                        summaries
                            .iter()
                            .filter_map(|s| s.get("text").and_then(Value::as_str))
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .unwrap_or_default();
                if text.is_empty() {
                    return None;
                }
                let block = ContentBlock::Thinking { text, signature: None };
                self.entry_from_blocks(
                    ctx,
                    timestamp,
                    EntryKind::Assistant,
                    "assistant",
                    vec![block],
                    raw,
                )
            }
            _ => {
                ctx.warn(
                    DiagnosticKind::UnrecognizedShape,
                    format!("unrecognized codex record shape: type={record_type:?} item={item_type:?} role={role:?}"),
                );
                None
            }
        }
    }

    /// Codex has no project directory convention; use the last path
    /// component of the session's working directory.
    fn derive_project_name(
        &self,
        _path: &Path,
        entries: &[Entry],
        ctx: &ParseContext,
    ) -> Option<String> {
        let cwd = ctx.cwd.clone().or_else(|| entries.iter().find_map(|e| e.cwd.clone()))?;
        Path::new(&cwd).file_name().map(|name| name.to_string_lossy().to_string())
    }
}
