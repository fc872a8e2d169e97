//! Frame and duration synthesis: turn a sorted entry sequence into an
//! ordered frame list with human-plausible playback pacing.

pub mod builder;
pub mod durations;

pub use builder::build_timeline;
pub use durations::assign_durations;
