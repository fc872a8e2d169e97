use std::fmt;

use serde::Serialize;

/// Why a record or block was skipped during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    MalformedJson,
    MissingField,
    UnrecognizedShape,
    UnrecognizedBlock,
}

/// A structured skip reason collected while parsing one file.
///
/// Skippable errors never abort the file; they accumulate here so callers
/// and tests can assert on them instead of scraping logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 1-based index of the offending record in file order, when known.
    pub record: Option<usize>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Some(record) => write!(f, "record {}: {:?}: {}", record, self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}
