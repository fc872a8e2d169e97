//! Data models for normalized session logs and playback timelines.
//!
//! This module defines the data structures used throughout the engine:
//!
//! - [`Entry`] - One normalized log record from a session file
//! - [`ContentBlock`] - One typed unit inside a message
//! - [`Frame`] - One display unit with a synthesized playback duration
//! - [`SessionTimeline`] - The ordered frame sequence handed to callers
//! - [`Diagnostic`] - A structured skip reason collected during parsing
//!
//! Input records are decoded from raw JSON values, with timestamp parsing
//! helpers in the `parsers::deserializers` module. Output models serialize
//! as camelCase for the playback viewer.

pub mod claude_md;
pub mod diagnostics;
pub mod entry;
pub mod frame;
pub mod timeline;

pub use claude_md::ClaudeMdReference;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use entry::{
    AgentType, ContentBlock, Entry, EntryKind, IndexedToolResult, Message, ToolResultContent,
    ToolResultIndex,
};
pub use frame::{FileDiff, Frame, FrameContext, FramePayload, ToolOutput};
pub use timeline::{ParsedSession, SessionMetadata, SessionTimeline, TimelineMetadata};
