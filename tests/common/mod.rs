//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

/// Render epoch milliseconds as the RFC 3339 timestamps the agents write.
pub fn rfc3339(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis).expect("valid millis").to_rfc3339()
}

/// Builder for one record of a Claude session file
pub struct ClaudeEntryBuilder {
    record_type: String,
    uuid: String,
    timestamp: i64,
    role: String,
    blocks: Vec<Value>,
    string_content: Option<String>,
    cwd: Option<String>,
    session_id: Option<String>,
    slug: Option<String>,
    model: Option<String>,
}

impl ClaudeEntryBuilder {
    pub fn user(uuid: &str, millis: i64) -> Self {
        Self {
            record_type: "user".to_string(),
            uuid: uuid.to_string(),
            timestamp: millis,
            role: "user".to_string(),
            blocks: Vec::new(),
            string_content: None,
            cwd: None,
            session_id: None,
            slug: None,
            model: None,
        }
    }

    pub fn assistant(uuid: &str, millis: i64) -> Self {
        let mut builder = Self::user(uuid, millis);
        builder.record_type = "assistant".to_string();
        builder.role = "assistant".to_string();
        builder
    }

    /// Set the message content to a plain string instead of blocks
    pub fn string_content(mut self, text: &str) -> Self {
        self.string_content = Some(text.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.blocks.push(json!({"type": "text", "text": text}));
        self
    }

    pub fn thinking(mut self, text: &str) -> Self {
        self.blocks.push(json!({"type": "thinking", "thinking": text, "signature": "sig-test"}));
        self
    }

    pub fn tool_use(mut self, id: &str, name: &str, input: Value) -> Self {
        self.blocks.push(json!({"type": "tool_use", "id": id, "name": name, "input": input}));
        self
    }

    pub fn tool_result(mut self, tool_use_id: &str, content: &str, is_error: bool) -> Self {
        self.blocks.push(json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content,
            "is_error": is_error
        }));
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let content: Value = match &self.string_content {
            Some(text) => json!(text),
            None => Value::Array(self.blocks.clone()),
        };
        let mut message = json!({"role": self.role, "content": content});
        if let Some(model) = &self.model {
            message["model"] = json!(model);
        }

        let mut record = json!({
            "type": self.record_type,
            "uuid": self.uuid,
            "timestamp": rfc3339(self.timestamp),
            "message": message
        });
        if let Some(cwd) = &self.cwd {
            record["cwd"] = json!(cwd);
        }
        if let Some(session_id) = &self.session_id {
            record["sessionId"] = json!(session_id);
        }
        if let Some(slug) = &self.slug {
            record["slug"] = json!(slug);
        }
        record.to_string()
    }
}

/// Write a Claude session file under the on-disk layout
/// `.claude/projects/<encoded>/<uuid>.jsonl`.
pub fn write_claude_session(encoded_project: &str, lines: &[String]) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().join(".claude").join("projects").join(encoded_project);
    fs::create_dir_all(&dir).expect("Failed to create project dir");

    let path = dir.join("11111111-2222-3333-4444-555555555555.jsonl");
    fs::write(&path, lines.join("\n")).expect("Failed to write session file");
    (temp, path)
}

/// Write a Codex rollout file under `.codex/sessions/`.
pub fn write_codex_session(lines: &[String]) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().join(".codex").join("sessions");
    fs::create_dir_all(&dir).expect("Failed to create sessions dir");

    let path = dir.join("rollout-2025-02-03T04-11-00-test.jsonl");
    fs::write(&path, lines.join("\n")).expect("Failed to write session file");
    (temp, path)
}

pub fn codex_session_meta(millis: i64, id: &str, cwd: &str) -> String {
    json!({
        "timestamp": rfc3339(millis),
        "type": "session_meta",
        "payload": {"id": id, "cwd": cwd}
    })
    .to_string()
}

pub fn codex_turn_context(millis: i64, cwd: &str, model: &str) -> String {
    json!({
        "timestamp": rfc3339(millis),
        "type": "turn_context",
        "payload": {"cwd": cwd, "model": model}
    })
    .to_string()
}

pub fn codex_message(millis: i64, role: &str, text: &str) -> String {
    json!({
        "timestamp": rfc3339(millis),
        "type": "response_item",
        "payload": {"type": "message", "role": role, "content": [{"type": "output_text", "text": text}]}
    })
    .to_string()
}

pub fn codex_reasoning(millis: i64, summaries: &[&str]) -> String {
    let parts: Vec<Value> =
        summaries.iter().map(|s| json!({"type": "summary_text", "text": s})).collect();
    json!({
        "timestamp": rfc3339(millis),
        "type": "response_item",
        "payload": {"type": "reasoning", "summary": parts}
    })
    .to_string()
}

pub fn codex_function_call(millis: i64, call_id: &str, name: &str, arguments: &str) -> String {
    json!({
        "timestamp": rfc3339(millis),
        "type": "response_item",
        "payload": {"type": "function_call", "call_id": call_id, "name": name, "arguments": arguments}
    })
    .to_string()
}

pub fn codex_function_call_output(millis: i64, call_id: &str, output: &str) -> String {
    json!({
        "timestamp": rfc3339(millis),
        "type": "response_item",
        "payload": {"type": "function_call_output", "call_id": call_id, "output": output}
    })
    .to_string()
}

/// Write a Gemini chat document under `.gemini/tmp/<hash>/chats/`.
pub fn write_gemini_session(
    session_id: &str,
    project_hash: &str,
    messages: &[Value],
) -> (TempDir, PathBuf) {
    let doc = json!({
        "sessionId": session_id,
        "projectHash": project_hash,
        "startTime": rfc3339(0),
        "messages": messages
    });

    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().join(".gemini").join("tmp").join(project_hash).join("chats");
    fs::create_dir_all(&dir).expect("Failed to create chats dir");

    let path = dir.join("session-test.json");
    fs::write(&path, doc.to_string()).expect("Failed to write session file");
    (temp, path)
}

pub fn gemini_user_message(id: &str, millis: i64, content: &str) -> Value {
    json!({"id": id, "timestamp": rfc3339(millis), "type": "user", "content": content})
}

pub fn gemini_model_message(id: &str, millis: i64, content: &str) -> Value {
    json!({"id": id, "timestamp": rfc3339(millis), "type": "gemini", "content": content})
}
