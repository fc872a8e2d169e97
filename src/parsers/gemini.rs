use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::models::{
    AgentType, ContentBlock, DiagnosticKind, Entry, EntryKind, ToolResultContent,
};
use crate::parsers::deserializers::parse_timestamp_value;
use crate::parsers::{AgentParser, ParseContext, message_from_blocks};
use crate::utils::validate_file_size;

/// Parser for Gemini CLI session files: one JSON document per session with
/// shape `{sessionId, projectHash, startTime, messages: [...]}`. Tool calls
/// carry their results inline, so correlation needs no second pass, but the
/// results still flow through the shared index contract.
pub struct GeminiParser;

/// How many characters of the project hash to keep as the display name.
const PROJECT_HASH_LEN: usize = 8;

impl AgentParser for GeminiParser {
    fn agent(&self) -> AgentType {
        AgentType::Gemini
    }

    /// The whole file is one JSON document, not line-delimited.
    fn read_records(&self, path: &Path, ctx: &mut ParseContext) -> Result<Vec<Value>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open session file: {}", path.display()))?;
        validate_file_size(&file, path)?;

        let doc: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse Gemini session: {}", path.display()))?;

        let Some(obj) = doc.as_object() else {
            bail!("Gemini session is not a JSON object: {}", path.display());
        };

        ctx.session_id = obj.get("sessionId").and_then(Value::as_str).map(str::to_string);
        ctx.project_hash = obj.get("projectHash").and_then(Value::as_str).map(str::to_string);

        match obj.get("messages").and_then(Value::as_array) {
            Some(messages) => Ok(messages.clone()),
            None => bail!("Gemini session has no messages array: {}", path.display()),
        }
    }

    fn parse_entry(&self, raw: &Value, ctx: &mut ParseContext) -> Option<Entry> {
        let Some(timestamp) = raw.get("timestamp").and_then(parse_timestamp_value) else {
            ctx.warn(DiagnosticKind::MissingField, "message has no parseable timestamp");
            return None;
        };

        let id = match raw.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => format!("gemini-{}", ctx.next_seq()),
        };

        let kind = match raw.get("type").and_then(Value::as_str) {
            Some("user") => EntryKind::User,
            Some("gemini") | Some("assistant") => EntryKind::Assistant,
            _ => EntryKind::Unknown,
        };
        let role = if kind == EntryKind::User { "user" } else { "assistant" };

        let mut blocks = Vec::new();

        // All thoughts of a message fold into one thinking block
        if let Some(thoughts) = raw.get("thoughts").and_then(Value::as_array)
            && !thoughts.is_empty()
        {
            let text = thoughts
                .iter()
                .filter_map(|thought| {
                    let subject = thought.get("subject").and_then(Value::as_str);
                    let description = thought.get("description").and_then(Value::as_str);
                    match (subject, description) {
                        (Some(s), Some(d)) => Some(format!("{s}: {d}")),
                        (Some(s), None) => Some(s.to_string()),
                        (None, Some(d)) => Some(d.to_string()),
                        (None, None) => None,
                    }
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            if !text.is_empty() {
                blocks.push(ContentBlock::Thinking { text, signature: None });
            }
        }

        if let Some(content) = raw.get("content").and_then(Value::as_str)
            && !content.is_empty()
        {
            blocks.push(ContentBlock::Text { text: content.to_string() });
        }

        if let Some(tool_calls) = raw.get("toolCalls").and_then(Value::as_array) {
            for call in tool_calls {
                let Some(name) = call.get("name").and_then(Value::as_str) else {
                    ctx.warn(DiagnosticKind::UnrecognizedShape, "tool call has no name");
                    continue;
                };
                let call_id = match call.get("id").and_then(Value::as_str) {
                    Some(id) => id.to_string(),
                    None => format!("call-{}", ctx.next_seq()),
                };
                blocks.push(ContentBlock::ToolUse {
                    id: call_id.clone(),
                    name: name.to_string(),
                    input: call.get("args").cloned().unwrap_or(Value::Null),
                });

                // Result is inline on the call record
                if let Some(result) = call.get("result") {
                    let content = match result {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let is_error = call
                        .get("status")
                        .and_then(Value::as_str)
                        .map(|status| matches!(status, "error" | "failed"));
                    blocks.push(ContentBlock::ToolResult {
                        tool_use_id: call_id,
                        content: ToolResultContent::Text(content),
                        is_error,
                    });
                }
            }
        }

        Some(Entry {
            id,
            parent_id: None,
            timestamp,
            kind,
            message: message_from_blocks(role, blocks),
            cwd: None,
            session_id: None,
            model: raw.get("model").and_then(Value::as_str).map(str::to_string),
            slug: None,
            raw: raw.clone(),
        })
    }

    /// Gemini names its session directory after a project hash; keep a
    /// truncated prefix as the display name.
    fn derive_project_name(
        &self,
        _path: &Path,
        _entries: &[Entry],
        ctx: &ParseContext,
    ) -> Option<String> {
        let hash = ctx.project_hash.as_deref()?;
        if hash.is_empty() {
            return None;
        }
        Some(hash.chars().take(PROJECT_HASH_LEN).collect())
    }
}
