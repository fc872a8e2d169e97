//! Extract CLAUDE.md contents embedded in session text.
//!
//! Agent transcripts quote project-memory files with a `Contents of
//! <path>CLAUDE.md:` marker followed by the file body. This pass scans each
//! entry's textual content for those markers, sanitizes the candidate paths,
//! and hashes the captured content for external dedup. Within one session a
//! path is recorded only on its first occurrence.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::models::{ClaudeMdReference, ContentBlock, Entry, ToolResultContent};

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Contents of (\S+?CLAUDE\.md):").expect("CLAUDE.md marker regex"));

/// Scan a session's entries for embedded CLAUDE.md contents.
pub fn extract_references(entries: &[Entry]) -> Vec<ClaudeMdReference> {
    let mut seen_paths: HashSet<String> = HashSet::new();
    let mut references = Vec::new();

    for entry in entries {
        let text = textual_content(entry);
        if text.is_empty() {
            continue;
        }

        // Collect marker positions first so each body can run to the next
        // marker or end of text
        let markers: Vec<(usize, usize, String)> = MARKER
            .captures_iter(&text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let path = caps.get(1)?.as_str().to_string();
                Some((whole.start(), whole.end(), path))
            })
            .collect();

        for (i, (_, body_start, path)) in markers.iter().enumerate() {
            if !is_plausible_path(path) {
                continue;
            }
            if !seen_paths.insert(path.clone()) {
                continue;
            }

            let body_end = markers.get(i + 1).map(|(start, _, _)| *start).unwrap_or(text.len());
            let body = text[*body_start..body_end].trim();
            let content = if body.is_empty() { None } else { Some(body.to_string()) };
            let content_hash =
                content.as_ref().map(|c| format!("{:x}", Sha256::digest(c.as_bytes())));

            references.push(ClaudeMdReference {
                path: path.clone(),
                loaded_at: entry.timestamp,
                content,
                content_hash,
            });
        }
    }

    references
}

/// Reject placeholder or relative paths that show up in prompts and docs.
fn is_plausible_path(path: &str) -> bool {
    if !path.starts_with('/') && !path.starts_with('~') {
        return false;
    }
    if path.contains("/path/") || path.contains("/path/to/") {
        return false;
    }
    if path.starts_with(".../") || path.starts_with('[') {
        return false;
    }
    true
}

/// Concatenate the entry's text-bearing blocks: text, thinking, and plain
/// string tool results.
fn textual_content(entry: &Entry) -> String {
    let Some(message) = &entry.message else {
        return String::new();
    };

    let mut parts: Vec<&str> = Vec::new();
    for block in &message.content {
        match block {
            ContentBlock::Text { text } => parts.push(text),
            ContentBlock::Thinking { text, .. } => parts.push(text),
            ContentBlock::ToolResult { content: ToolResultContent::Text(text), .. } => {
                parts.push(text);
            }
            _ => {}
        }
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::Value;

    use super::*;
    use crate::models::{EntryKind, Message};

    fn text_entry(id: &str, text: &str) -> Entry {
        Entry {
            id: id.to_string(),
            parent_id: None,
            timestamp: DateTime::from_timestamp_millis(1_000).unwrap(),
            kind: EntryKind::User,
            message: Some(Message {
                role: "user".into(),
                content: vec![ContentBlock::Text { text: text.into() }],
            }),
            cwd: None,
            session_id: None,
            model: None,
            slug: None,
            raw: Value::Null,
        }
    }

    #[test]
    fn test_extracts_path_content_and_hash() {
        let entries = vec![text_entry("e1", "Contents of /a/CLAUDE.md:\nHello")];
        let refs = extract_references(&entries);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "/a/CLAUDE.md");
        assert_eq!(refs[0].content.as_deref(), Some("Hello"));
        // sha256("Hello")
        assert_eq!(
            refs[0].content_hash.as_deref(),
            Some("185f8db32271fe25f561a6fc938b2e264306ec304eda518007d1764826381969")
        );
    }

    #[test]
    fn test_placeholder_paths_rejected() {
        let entries = vec![
            text_entry("e1", "Contents of /path/to/CLAUDE.md:\nstuff"),
            text_entry("e2", "Contents of [project]/CLAUDE.md:\nstuff"),
            text_entry("e3", "Contents of relative/CLAUDE.md:\nstuff"),
        ];
        assert!(extract_references(&entries).is_empty());
    }

    #[test]
    fn test_tilde_path_accepted() {
        let entries = vec![text_entry("e1", "Contents of ~/CLAUDE.md:\nglobal rules")];
        let refs = extract_references(&entries);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "~/CLAUDE.md");
    }

    #[test]
    fn test_path_recorded_once_per_session() {
        let entries = vec![
            text_entry("e1", "Contents of /a/CLAUDE.md:\nfirst"),
            text_entry("e2", "Contents of /a/CLAUDE.md:\nsecond"),
        ];
        let refs = extract_references(&entries);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].content.as_deref(), Some("first"));
    }

    #[test]
    fn test_consecutive_markers_split_content() {
        let entries = vec![text_entry(
            "e1",
            "Contents of /a/CLAUDE.md:\nalpha\nContents of /b/CLAUDE.md:\nbeta",
        )];
        let refs = extract_references(&entries);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].content.as_deref(), Some("alpha"));
        assert_eq!(refs[1].path, "/b/CLAUDE.md");
        assert_eq!(refs[1].content.as_deref(), Some("beta"));
    }

    #[test]
    fn test_marker_without_body_has_no_content_or_hash() {
        let entries = vec![text_entry("e1", "Contents of /a/CLAUDE.md:")];
        let refs = extract_references(&entries);
        assert_eq!(refs.len(), 1);
        assert!(refs[0].content.is_none());
        assert!(refs[0].content_hash.is_none());
    }

    #[test]
    fn test_thinking_and_tool_result_text_scanned() {
        let mut entry = text_entry("e1", "preamble");
        entry.message = Some(Message {
            role: "assistant".into(),
            content: vec![
                ContentBlock::Thinking {
                    text: "Contents of /t/CLAUDE.md:\nfrom thinking".into(),
                    signature: None,
                },
                ContentBlock::ToolResult {
                    tool_use_id: "t1".into(),
                    content: ToolResultContent::Text(
                        "Contents of /r/CLAUDE.md:\nfrom result".into(),
                    ),
                    is_error: None,
                },
            ],
        });
        let refs = extract_references(&[entry]);
        let paths: Vec<&str> = refs.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/t/CLAUDE.md", "/r/CLAUDE.md"]);
    }
}
