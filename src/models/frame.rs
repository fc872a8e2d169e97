use serde::Serialize;
use serde_json::Value;

use crate::models::AgentType;

/// One display unit derived from a content block, with a synthesized
/// timestamp and playback duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Derived deterministically from entry id, block kind and position, so
    /// re-parsing the same file yields the same ids.
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Playback duration in milliseconds, assigned by the synthesizer.
    pub duration: i64,
    /// The real gap this frame covered before dead-air compression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_duration: Option<i64>,
    pub is_compressed: bool,
    pub agent: AgentType,
    pub context: FrameContext,
    #[serde(flatten)]
    pub payload: FramePayload,
}

impl Frame {
    /// Short tag used in frame ids and stats grouping.
    pub fn kind_tag(&self) -> &'static str {
        self.payload.kind_tag()
    }
}

/// The four frame variants a content block can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FramePayload {
    UserMessage {
        text: String,
    },
    Thinking {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    Response {
        text: String,
    },
    ToolExecution {
        tool: String,
        input: Value,
        output: ToolOutput,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_diff: Option<FileDiff>,
    },
}

impl FramePayload {
    pub fn kind_tag(&self) -> &'static str {
        match self {
            FramePayload::UserMessage { .. } => "user",
            FramePayload::Thinking { .. } => "thinking",
            FramePayload::Response { .. } => "response",
            FramePayload::ToolExecution { .. } => "tool",
        }
    }
}

/// Merged output of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Old/new content for file-mutating tools, with language inferred from the
/// file extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    pub old_content: String,
    pub new_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Per-frame context consumed by the cross-session correlator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_read: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_modified: Vec<String>,
}
