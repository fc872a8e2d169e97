//! Per-agent session log parsers.
//!
//! # Error Handling Strategy
//!
//! Parsing follows a **graceful degradation** approach:
//!
//! - **Individual record failures**: malformed JSON lines, records missing
//!   required fields, and unrecognized block shapes are skipped, and each skip
//!   is recorded as a structured [`Diagnostic`] returned alongside the parsed
//!   entries — the library never writes to stderr itself.
//!
//! - **Catastrophic failure detection**: if more than 50% of lines fail to
//!   parse, or more than 100 consecutive errors occur, the parser returns an
//!   error. This prevents accepting severely corrupted files.
//!
//! - **Error propagation**: fatal I/O errors (file missing, unreadable,
//!   oversized) propagate as `anyhow::Result` with context; nothing in the
//!   skippable categories may abort the rest of the file.

pub mod claude;
pub mod codex;
pub mod deserializers;
pub mod gemini;

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde_json::Value;

pub use claude::ClaudeParser;
pub use codex::CodexParser;
pub use gemini::GeminiParser;

use crate::models::{
    AgentType, ContentBlock, Diagnostic, DiagnosticKind, Entry, EntryKind, FileDiff, Frame,
    FrameContext, FramePayload, IndexedToolResult, Message, ParsedSession, SessionMetadata,
    ToolOutput, ToolResultIndex,
};
use crate::utils::{language_for_path, validate_file_size};

const MAX_CONSECUTIVE_ERRORS: usize = 100;

/// Output produced by a tool invocation with no recorded result yet.
pub const NO_RESULT_PLACEHOLDER: &str = "(No result available)";

static EXIT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)exit code:?\s*(-?\d+)").expect("exit code regex"));

/// Mutable state scoped to a single `parse_file` call.
///
/// Parsers themselves are stateless; everything a format needs to remember
/// across records (session metadata from wrapper records, the Codex
/// call-id → tool-name registry, the synthesized-id counter) lives here so a
/// shared parser instance can serve concurrent files.
#[derive(Debug, Default)]
pub struct ParseContext {
    pub diagnostics: Vec<Diagnostic>,
    /// 1-based index of the record currently being parsed.
    pub record: Option<usize>,
    /// Session id announced by a wrapper record (Codex `session_meta`,
    /// Gemini document header).
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub model: Option<String>,
    /// Gemini document-level project hash.
    pub project_hash: Option<String>,
    call_names: HashMap<String, String>,
    seq: u64,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skip reason for the current record.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic { record: self.record, kind, message: message.into() });
    }

    /// Next value of the per-file counter used to synthesize record ids for
    /// formats that carry none. Deterministic for a fixed file.
    pub fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Remember the tool name behind a call id, for formats whose results
    /// reference calls by id only.
    pub fn remember_call(&mut self, id: &str, name: &str) {
        self.call_names.insert(id.to_string(), name.to_string());
    }

    pub fn call_name(&self, id: &str) -> Option<&str> {
        self.call_names.get(id).map(String::as_str)
    }
}

/// Shared contract implemented by each agent parser.
///
/// The provided methods form the template: `parse_file` drives record
/// decoding and sorting identically for every format, while the required
/// methods cover the per-format variance.
pub trait AgentParser: Send + Sync {
    fn agent(&self) -> AgentType;

    /// Decode the file into raw records in file order. Defaults to JSONL;
    /// Gemini overrides this to unwrap its single-document format.
    fn read_records(&self, path: &Path, ctx: &mut ParseContext) -> Result<Vec<Value>> {
        read_jsonl_records(path, ctx)
    }

    /// Decode one raw record into a normalized entry, or `None` for
    /// malformed or irrelevant records. Must never fail the file.
    fn parse_entry(&self, raw: &Value, ctx: &mut ParseContext) -> Option<Entry>;

    /// Build the id → result map from the full entry sequence. The default
    /// scans every entry's tool-result blocks, which suits all formats that
    /// normalize results into blocks (including inline Gemini results).
    /// Orphan results are stored; unmatched lookups degrade at frame time.
    fn collect_tool_results(&self, entries: &[Entry]) -> ToolResultIndex {
        let mut index = ToolResultIndex::new();
        for entry in entries {
            let Some(message) = &entry.message else { continue };
            for block in &message.content {
                if let ContentBlock::ToolResult { tool_use_id, content, is_error } = block {
                    index.insert(
                        tool_use_id.clone(),
                        IndexedToolResult { content: content.clone(), is_error: *is_error },
                    );
                }
            }
        }
        index
    }

    /// Derive a human-readable project name. Each agent stores sessions
    /// under an unrelated convention, so each parser keeps its own strategy.
    fn derive_project_name(
        &self,
        path: &Path,
        entries: &[Entry],
        ctx: &ParseContext,
    ) -> Option<String>;

    /// Merge a tool call with its (possibly missing) result.
    fn extract_tool_execution(
        &self,
        name: &str,
        input: &Value,
        result: Option<&IndexedToolResult>,
    ) -> FramePayload {
        let output = match result {
            Some(result) => {
                let content = result.content.flatten();
                ToolOutput {
                    exit_code: detect_exit_code(&content),
                    is_error: result.is_error.unwrap_or(false),
                    content,
                }
            }
            None => ToolOutput {
                content: NO_RESULT_PLACEHOLDER.to_string(),
                is_error: false,
                exit_code: None,
            },
        };

        FramePayload::ToolExecution {
            tool: name.to_string(),
            input: input.clone(),
            output,
            file_diff: file_diff_for(name, input),
        }
    }

    /// Convert one entry's content blocks, in order, into zero or more
    /// frames. Whitespace-only text and unrecognized blocks are skipped;
    /// tool-result blocks surface through the matching tool-use frame.
    fn extract_frames_from_entry(&self, entry: &Entry, results: &ToolResultIndex) -> Vec<Frame> {
        let mut frames = Vec::new();
        let Some(message) = &entry.message else {
            return frames;
        };
        let timestamp = entry.timestamp.timestamp_millis();

        for block in &message.content {
            let payload = match block {
                ContentBlock::Text { text } => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    match entry.kind {
                        EntryKind::User => FramePayload::UserMessage { text: text.clone() },
                        _ => FramePayload::Response { text: text.clone() },
                    }
                }
                ContentBlock::Thinking { text, signature } => {
                    FramePayload::Thinking { text: text.clone(), signature: signature.clone() }
                }
                ContentBlock::ToolUse { id, name, input } => {
                    self.extract_tool_execution(name, input, results.get(id))
                }
                ContentBlock::ToolResult { .. } | ContentBlock::Unrecognized { .. } => continue,
            };

            let id = format!("{}-{}-{}", entry.id, payload.kind_tag(), frames.len());
            frames.push(Frame {
                id,
                timestamp,
                duration: 0,
                original_duration: None,
                is_compressed: false,
                agent: self.agent(),
                context: context_for(entry, &payload),
                payload,
            });
        }

        frames
    }

    /// Template method: read records, decode entries, sort, and derive
    /// session metadata. Identical across formats.
    fn parse_file(&self, path: &Path) -> Result<ParsedSession> {
        let mut ctx = ParseContext::new();
        let records = self.read_records(path, &mut ctx)?;

        let mut entries = Vec::with_capacity(records.len());
        for (i, raw) in records.iter().enumerate() {
            ctx.record = Some(i + 1);
            if let Some(entry) = self.parse_entry(raw, &mut ctx) {
                entries.push(entry);
            }
        }
        ctx.record = None;

        // Stable: ties keep file order
        entries.sort_by_key(|entry| entry.timestamp);

        let session_id = entries
            .iter()
            .find_map(|entry| entry.session_id.clone())
            .or_else(|| ctx.session_id.clone())
            .unwrap_or_else(|| file_stem(path));

        let metadata = SessionMetadata {
            started_at: entries.first().map(|entry| entry.timestamp),
            ended_at: entries.last().map(|entry| entry.timestamp),
            slug: entries.iter().find_map(|entry| entry.slug.clone()),
            project_name: self.derive_project_name(path, &entries, &ctx),
            cwd: entries.iter().find_map(|entry| entry.cwd.clone()).or_else(|| ctx.cwd.clone()),
            model: entries
                .iter()
                .find_map(|entry| entry.model.clone())
                .or_else(|| ctx.model.clone()),
        };

        Ok(ParsedSession {
            session_id,
            agent: self.agent(),
            entries,
            metadata,
            diagnostics: ctx.diagnostics,
        })
    }
}

/// Select the parser for a detected or declared agent type. `Unknown` falls
/// back to the Claude parser rather than failing.
pub fn parser_for(agent: AgentType) -> &'static dyn AgentParser {
    static CLAUDE: ClaudeParser = ClaudeParser;
    static CODEX: CodexParser = CodexParser;
    static GEMINI: GeminiParser = GeminiParser;

    match agent {
        AgentType::Codex => &CODEX,
        AgentType::Gemini => &GEMINI,
        AgentType::Claude | AgentType::Unknown => &CLAUDE,
    }
}

/// Read newline-delimited JSON records. Blank lines are ignored; malformed
/// lines become diagnostics unless they cross the corruption thresholds.
pub(crate) fn read_jsonl_records(path: &Path, ctx: &mut ParseContext) -> Result<Vec<Value>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut total = 0usize;
    let mut consecutive_errors = 0usize;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line from {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        total += 1;

        match serde_json::from_str::<Value>(&line) {
            Ok(value) => {
                records.push(value);
                consecutive_errors = 0;
            }
            Err(e) => {
                ctx.diagnostics.push(Diagnostic {
                    record: Some(line_num + 1),
                    kind: DiagnosticKind::MalformedJson,
                    message: e.to_string(),
                });
                skipped += 1;
                consecutive_errors += 1;

                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    bail!(
                        "Too many consecutive parse errors ({}) in {} - file may be corrupted",
                        consecutive_errors,
                        path.display()
                    );
                }
            }
        }
    }

    if total > 0 {
        let failure_rate = (skipped as f64) / (total as f64);
        if failure_rate > 0.5 {
            bail!(
                "Too many parse failures in {}: {} of {} lines failed ({:.1}%)",
                path.display(),
                skipped,
                total,
                failure_rate * 100.0
            );
        }
    }

    Ok(records)
}

/// Extract an exit code mentioned in tool output, if any.
pub fn detect_exit_code(content: &str) -> Option<i32> {
    EXIT_CODE.captures(content)?.get(1)?.as_str().parse().ok()
}

/// Build a message from normalized blocks, or `None` when nothing survived.
pub(crate) fn message_from_blocks(role: &str, content: Vec<ContentBlock>) -> Option<Message> {
    if content.is_empty() {
        None
    } else {
        Some(Message { role: role.to_string(), content })
    }
}

fn context_for(entry: &Entry, payload: &FramePayload) -> FrameContext {
    let mut context = FrameContext { cwd: entry.cwd.clone(), ..FrameContext::default() };

    if let FramePayload::ToolExecution { tool, input, .. } = payload
        && let Some(file_path) = input.get("file_path").and_then(Value::as_str)
    {
        match tool.as_str() {
            "Read" => context.files_read.push(file_path.to_string()),
            "Write" | "Edit" => context.files_modified.push(file_path.to_string()),
            _ => {}
        }
    }

    context
}

fn file_diff_for(tool: &str, input: &Value) -> Option<FileDiff> {
    let file_path = input.get("file_path").and_then(Value::as_str);
    let language = file_path.and_then(language_for_path).map(str::to_string);

    match tool {
        "Write" => {
            let new_content = input.get("content").and_then(Value::as_str)?;
            Some(FileDiff {
                old_content: String::new(),
                new_content: new_content.to_string(),
                language,
            })
        }
        "Edit" => {
            let old = input.get("old_string").and_then(Value::as_str)?;
            let new = input.get("new_string").and_then(Value::as_str)?;
            Some(FileDiff {
                old_content: old.to_string(),
                new_content: new.to_string(),
                language,
            })
        }
        _ => None,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| "unknown".into())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_read_jsonl_skips_blank_and_malformed_lines() {
        let file = create_test_file("{\"a\":1}\n\nnot json\n{\"b\":2}\n");
        let mut ctx = ParseContext::new();
        let records = read_jsonl_records(file.path(), &mut ctx).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::MalformedJson);
        assert_eq!(ctx.diagnostics[0].record, Some(3));
    }

    #[test]
    fn test_read_jsonl_fails_over_50_percent_corruption() {
        let file = create_test_file("bad 1\n{\"a\":1}\nbad 2\nbad 3\n");
        let mut ctx = ParseContext::new();
        let err = read_jsonl_records(file.path(), &mut ctx).unwrap_err();
        assert!(err.to_string().contains("Too many parse failures"));
    }

    #[test]
    fn test_read_jsonl_fails_after_consecutive_errors() {
        let content = "bad line\n".repeat(101);
        let file = create_test_file(&content);
        let mut ctx = ParseContext::new();
        let err = read_jsonl_records(file.path(), &mut ctx).unwrap_err();
        assert!(err.to_string().contains("Too many consecutive parse errors"));
    }

    #[test]
    fn test_read_jsonl_missing_file_is_fatal() {
        let mut ctx = ParseContext::new();
        let err = read_jsonl_records(Path::new("/nonexistent/session.jsonl"), &mut ctx)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_detect_exit_code() {
        assert_eq!(detect_exit_code("command failed with exit code 2"), Some(2));
        assert_eq!(detect_exit_code("Exit Code: 127"), Some(127));
        assert_eq!(detect_exit_code("all good"), None);
    }

    #[test]
    fn test_parser_for_falls_back_to_claude() {
        assert_eq!(parser_for(AgentType::Unknown).agent(), AgentType::Claude);
        assert_eq!(parser_for(AgentType::Codex).agent(), AgentType::Codex);
        assert_eq!(parser_for(AgentType::Gemini).agent(), AgentType::Gemini);
    }

    #[test]
    fn test_collect_tool_results_is_order_independent() {
        let result_entry = |id: &str, millis: i64, content: &str| Entry {
            id: id.to_string(),
            parent_id: None,
            timestamp: chrono::DateTime::from_timestamp_millis(millis).unwrap(),
            kind: EntryKind::User,
            message: Some(Message {
                role: "user".into(),
                content: vec![ContentBlock::ToolResult {
                    tool_use_id: id.to_string(),
                    content: crate::models::ToolResultContent::Text(content.into()),
                    is_error: None,
                }],
            }),
            cwd: None,
            session_id: None,
            model: None,
            slug: None,
            raw: Value::Null,
        };

        let a = result_entry("t1", 1_000, "first");
        let b = result_entry("t2", 2_000, "second");
        let c = result_entry("t3", 3_000, "third");

        let parser = parser_for(AgentType::Claude);
        let forward = parser.collect_tool_results(&[a.clone(), b.clone(), c.clone()]);
        let reversed = parser.collect_tool_results(&[c, b, a]);

        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 3);
    }

    #[test]
    fn test_file_diff_for_write_and_edit() {
        let write = file_diff_for("Write", &json!({"file_path": "/a/main.rs", "content": "fn main() {}"}))
            .unwrap();
        assert_eq!(write.old_content, "");
        assert_eq!(write.new_content, "fn main() {}");
        assert_eq!(write.language.as_deref(), Some("rust"));

        let edit = file_diff_for("Edit", &json!({"file_path": "/a/app.py", "old_string": "x", "new_string": "y"}))
            .unwrap();
        assert_eq!(edit.old_content, "x");
        assert_eq!(edit.new_content, "y");
        assert_eq!(edit.language.as_deref(), Some("python"));

        assert!(file_diff_for("Bash", &json!({"command": "ls"})).is_none());
    }
}
