use std::path::Path;

use serde_json::Value;

use crate::models::{AgentType, ContentBlock, DiagnosticKind, Entry, EntryKind};
use crate::parsers::deserializers::parse_timestamp_value;
use crate::parsers::{AgentParser, ParseContext, message_from_blocks};
use crate::utils::decode_project_dir;

/// Parser for Claude Code session files: newline-delimited JSON under
/// `~/.claude/projects/<encoded-path>/<uuid>.jsonl`. Content blocks are
/// already close to the normalized shape.
pub struct ClaudeParser;

impl AgentParser for ClaudeParser {
    fn agent(&self) -> AgentType {
        AgentType::Claude
    }

    fn parse_entry(&self, raw: &Value, ctx: &mut ParseContext) -> Option<Entry> {
        let record_type = raw.get("type").and_then(Value::as_str);
        let raw_message = raw.get("message");

        // Non-conversation records (summary, file-history-snapshot, ...) are
        // skipped without a diagnostic; they are expected in every session.
        let is_conversation = matches!(record_type, Some("user" | "assistant" | "system"));
        if !is_conversation && raw_message.is_none() {
            return None;
        }

        let Some(id) = raw.get("uuid").and_then(Value::as_str) else {
            ctx.warn(DiagnosticKind::MissingField, "record has no uuid");
            return None;
        };
        let Some(timestamp) = raw.get("timestamp").and_then(parse_timestamp_value) else {
            ctx.warn(
                DiagnosticKind::MissingField,
                format!("record {id} has no parseable timestamp"),
            );
            return None;
        };

        let role = raw_message
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str);

        // Explicit record type wins; otherwise infer the kind from the role
        let kind = record_type
            .or(role)
            .map(EntryKind::from_role)
            .unwrap_or(EntryKind::Unknown);

        let message = raw_message.and_then(|m| {
            let blocks = match m.get("content") {
                Some(Value::String(text)) => vec![ContentBlock::Text { text: text.clone() }],
                Some(Value::Array(items)) => {
                    let blocks: Vec<ContentBlock> =
                        items.iter().map(ContentBlock::from_raw).collect();
                    for block in &blocks {
                        if let ContentBlock::Unrecognized { raw } = block {
                            ctx.warn(
                                DiagnosticKind::UnrecognizedBlock,
                                format!(
                                    "unrecognized content block kind {:?} in {id}",
                                    raw.get("type").and_then(Value::as_str).unwrap_or("<none>")
                                ),
                            );
                        }
                    }
                    blocks
                }
                _ => Vec::new(),
            };
            message_from_blocks(role.unwrap_or("user"), blocks)
        });

        Some(Entry {
            id: id.to_string(),
            parent_id: raw.get("parentUuid").and_then(Value::as_str).map(str::to_string),
            timestamp,
            kind,
            message,
            cwd: raw.get("cwd").and_then(Value::as_str).map(str::to_string),
            session_id: raw.get("sessionId").and_then(Value::as_str).map(str::to_string),
            model: raw_message
                .and_then(|m| m.get("model"))
                .and_then(Value::as_str)
                .map(str::to_string),
            slug: raw.get("slug").and_then(Value::as_str).map(str::to_string),
            raw: raw.clone(),
        })
    }

    /// Claude stores each session under an encoded copy of the project path;
    /// the project name is the last component of the decoded directory.
    fn derive_project_name(
        &self,
        path: &Path,
        _entries: &[Entry],
        _ctx: &ParseContext,
    ) -> Option<String> {
        let encoded = path.parent()?.file_name()?.to_str()?;
        if !encoded.starts_with('-') {
            return None;
        }
        let decoded = decode_project_dir(encoded);
        decoded.file_name().map(|name| name.to_string_lossy().to_string())
    }
}
