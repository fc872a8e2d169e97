//! session-replay - Normalize coding-agent session logs into playback timelines
//!
//! This library ingests session logs written by three agent CLIs (Claude
//! Code, Codex, Gemini CLI) in their incompatible on-disk formats and
//! converts each session into a single ordered sequence of playback frames
//! with synthesized display durations. It supports:
//!
//! - Detecting the producing agent from a file path or its first record
//! - Parsing each format into a normalized entry sequence
//! - Correlating tool calls with their (possibly later) results
//! - Synthesizing playback pacing, with dead-air compression for large gaps
//! - Extracting embedded CLAUDE.md contents for external dedup
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use session_replay::load_timeline;
//!
//! let (timeline, diagnostics) = load_timeline(Path::new("session.jsonl"), None)?;
//! println!("{} frames, {} records skipped", timeline.total_frames, diagnostics.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod claude_md;
pub mod cli;
pub mod detector;
pub mod models;
pub mod parsers;
pub mod timeline;
pub mod utils;

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

// Re-export commonly used types
pub use detector::{detect, detect_from_content, detect_from_path};
pub use models::{AgentType, Diagnostic, Frame, SessionTimeline};
pub use parsers::{AgentParser, parser_for};
pub use timeline::build_timeline;

/// Parse one session file and build its playback timeline.
///
/// When `declared` is `None`, the agent type is detected from the path and,
/// failing that, from the first parsed record; no match falls back to the
/// Claude parser. Skippable record errors are returned as diagnostics;
/// fatal I/O errors propagate.
pub fn load_timeline(
    path: &Path,
    declared: Option<AgentType>,
) -> Result<(SessionTimeline, Vec<Diagnostic>)> {
    let agent = match declared {
        Some(agent) => agent,
        None => detect_agent(path)?,
    };

    let parser = parser_for(agent);
    let parsed = parser.parse_file(path)?;
    let timeline = build_timeline(parser, &parsed);
    Ok((timeline, parsed.diagnostics))
}

/// Detect the producing agent for a session file from its path and, if the
/// path is inconclusive, from its first record.
pub fn detect_agent(path: &Path) -> Result<AgentType> {
    match detect_from_path(path) {
        AgentType::Unknown => {
            let record = first_record(path)?;
            Ok(detect(path, record.as_ref()))
        }
        detected => Ok(detected),
    }
}

/// First parsed record of a session file, for content-based detection: the
/// first non-empty line if it is JSON, else the whole file as one document
/// (the Gemini layout). `None` when neither parses.
fn first_record(path: &Path) -> Result<Option<Value>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    utils::validate_file_size(&file, path)?;

    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.with_context(|| format!("Failed to read line from {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&line) {
            return Ok(Some(value));
        }
        break;
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    Ok(serde_json::from_str(&content).ok())
}
