use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AgentType, ClaudeMdReference, Diagnostic, Entry, Frame};

/// Session-level fields derived during parsing, before frames exist.
#[derive(Debug, Clone, Default)]
pub struct SessionMetadata {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub project_name: Option<String>,
    pub cwd: Option<String>,
    pub model: Option<String>,
}

/// Result of parsing one session file: sorted entries plus everything the
/// timeline builder needs, with skip reasons alongside.
#[derive(Debug)]
pub struct ParsedSession {
    pub session_id: String,
    pub agent: AgentType,
    /// Sorted by timestamp ascending; ties keep file order.
    pub entries: Vec<Entry>,
    pub metadata: SessionMetadata,
    pub diagnostics: Vec<Diagnostic>,
}

/// The unit handed to external callers: an ordered frame sequence with
/// synthesized durations, plus session metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTimeline {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub agent: AgentType,
    /// Epoch milliseconds of the first and last entry.
    pub started_at: i64,
    pub ended_at: i64,
    pub total_frames: usize,
    pub frames: Vec<Frame>,
    pub metadata: TimelineMetadata,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub claude_md_references: Vec<ClaudeMdReference>,
}
