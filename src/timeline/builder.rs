use crate::claude_md;
use crate::models::{ParsedSession, SessionTimeline, TimelineMetadata};
use crate::parsers::AgentParser;
use crate::timeline::assign_durations;

/// Turn a parsed session into the ordered frame sequence handed to callers.
///
/// Steps: build the tool-result index once for the whole entry list, extract
/// frames per entry in order (entry order, then block order within an
/// entry), run the duration pass, and assemble the timeline.
pub fn build_timeline(parser: &dyn AgentParser, parsed: &ParsedSession) -> SessionTimeline {
    let results = parser.collect_tool_results(&parsed.entries);

    let mut frames = Vec::new();
    for entry in &parsed.entries {
        frames.extend(parser.extract_frames_from_entry(entry, &results));
    }

    assign_durations(&mut frames);

    let claude_md_references = claude_md::extract_references(&parsed.entries);

    let started_at = parsed
        .metadata
        .started_at
        .map(|t| t.timestamp_millis())
        .unwrap_or(0);
    let ended_at = parsed
        .metadata
        .ended_at
        .map(|t| t.timestamp_millis())
        .unwrap_or(started_at);

    SessionTimeline {
        session_id: parsed.session_id.clone(),
        slug: parsed.metadata.slug.clone(),
        project_name: parsed.metadata.project_name.clone(),
        agent: parsed.agent,
        started_at,
        ended_at,
        total_frames: frames.len(),
        frames,
        metadata: TimelineMetadata {
            cwd: parsed.metadata.cwd.clone(),
            model: parsed.metadata.model.clone(),
            claude_md_references,
        },
    }
}
