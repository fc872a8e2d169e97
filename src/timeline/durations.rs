use crate::models::{Frame, FramePayload};

/// Gaps longer than this are dead air and play back compressed.
const DEAD_AIR_THRESHOLD_MS: i64 = 5_000;
/// Fixed playback length for a compressed dead-air gap.
const DEAD_AIR_PLAYBACK_MS: i64 = 1_500;
const LONG_GAP_THRESHOLD_MS: i64 = 30_000;

/// Assign a playback duration to every frame, in one pass over the ordered
/// list. Pure: never reorders and never drops frames.
///
/// Each frame plays for the real gap to its successor, except that dead air
/// is compressed to a fixed short duration with the real gap retained in
/// `original_duration`. The final frame gets a default based on its kind.
pub fn assign_durations(frames: &mut [Frame]) {
    let len = frames.len();
    for i in 0..len {
        if i + 1 < len {
            let gap = frames[i + 1].timestamp - frames[i].timestamp;
            if gap > DEAD_AIR_THRESHOLD_MS {
                frames[i].original_duration = Some(gap);
                frames[i].duration = DEAD_AIR_PLAYBACK_MS;
                frames[i].is_compressed = true;
            } else if gap < LONG_GAP_THRESHOLD_MS {
                frames[i].duration = gap;
            } else {
                // Long gaps that are not dead air by the first rule; the
                // dead-air branch currently shadows this tier, but it is a
                // distinct rule and stays one.
                frames[i].original_duration = Some(gap);
                frames[i].duration = default_duration(&frames[i].payload);
                frames[i].is_compressed = true;
            }
        } else {
            frames[i].duration = default_duration(&frames[i].payload);
        }
    }
}

/// Default playback duration by frame kind, used where no real gap applies.
fn default_duration(payload: &FramePayload) -> i64 {
    match payload {
        FramePayload::UserMessage { text } => {
            if text.len() > 200 {
                3_000
            } else {
                2_000
            }
        }
        FramePayload::Thinking { .. } => 1_000,
        FramePayload::Response { text } => (3_000 + text.len() as i64 / 100).min(5_000),
        FramePayload::ToolExecution { tool, .. } => {
            if tool == "Bash" {
                2_000
            } else {
                1_000
            }
        }
    }
}
