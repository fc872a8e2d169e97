use chrono::{DateTime, Utc};
use serde::Serialize;

/// A CLAUDE.md file whose contents were observed inside session text.
///
/// Discovered during a single parse pass and deduplicated by path within
/// that session; cross-session dedup (by content hash) is the responsibility
/// of an external store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeMdReference {
    pub path: String,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// SHA-256 hex digest of `content`, for external dedup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}
