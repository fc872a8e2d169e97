//! Classify a session file as one of the known agent CLIs.
//!
//! Detection is pure and two-stage: path markers first, then format
//! fingerprints in the first parsed record. No match yields
//! [`AgentType::Unknown`], which the parser factory maps to the Claude
//! parser rather than failing.

use std::path::Path;

use serde_json::Value;
use uuid::Uuid;

use crate::models::AgentType;

/// Classify by the session-storage conventions each agent CLI uses on disk.
pub fn detect_from_path(path: &Path) -> AgentType {
    let path_str = path.to_string_lossy();
    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

    if path_str.contains(".claude/projects") {
        AgentType::Claude
    } else if path_str.contains(".codex/sessions") || file_name.starts_with("rollout-") {
        AgentType::Codex
    } else if path_str.contains(".gemini/tmp") {
        AgentType::Gemini
    } else {
        AgentType::Unknown
    }
}

/// Classify by format fingerprints in the first parsed record.
pub fn detect_from_content(record: &Value) -> AgentType {
    if looks_like_claude(record) {
        AgentType::Claude
    } else if looks_like_codex(record) {
        AgentType::Codex
    } else if looks_like_gemini(record) {
        AgentType::Gemini
    } else {
        AgentType::Unknown
    }
}

/// Path detection first; if unknown, fall back to the first record.
pub fn detect(path: &Path, first_record: Option<&Value>) -> AgentType {
    match detect_from_path(path) {
        AgentType::Unknown => first_record.map(detect_from_content).unwrap_or(AgentType::Unknown),
        detected => detected,
    }
}

/// A UUID-shaped session id plus either a signed thinking block or a
/// tool-call block carrying both an id and a name.
fn looks_like_claude(record: &Value) -> bool {
    let has_uuid_session = record
        .get("sessionId")
        .and_then(Value::as_str)
        .is_some_and(|id| Uuid::parse_str(id).is_ok());
    if !has_uuid_session {
        return false;
    }

    let Some(blocks) = record
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_array)
    else {
        return false;
    };

    blocks.iter().any(|block| {
        let block_type = block.get("type").and_then(Value::as_str).unwrap_or("");
        match block_type {
            "thinking" => block.get("signature").is_some(),
            "tool_use" => block.get("id").is_some() && block.get("name").is_some(),
            _ => false,
        }
    })
}

/// OpenAI model-name prefixes or function-calling fields, possibly inside a
/// `{type, payload}` envelope.
fn looks_like_codex(record: &Value) -> bool {
    let payload = record.get("payload").unwrap_or(record);

    let model_matches = payload.get("model").and_then(Value::as_str).is_some_and(|model| {
        model.starts_with("o1") || model.starts_with("o3") || model.starts_with("gpt-")
    });

    model_matches
        || payload.get("tool_calls").is_some()
        || payload.get("function_call").is_some()
}

/// Google model names or response fields, or the single-document session shape.
fn looks_like_gemini(record: &Value) -> bool {
    let model_matches = record
        .get("model")
        .and_then(Value::as_str)
        .is_some_and(|model| model.starts_with("gemini"));

    model_matches
        || record.get("candidates").is_some()
        || record.get("functionCalls").is_some()
        || (record.get("messages").is_some() && record.get("projectHash").is_some())
}
