//! Engine results and errors.

use thiserror::Error;

use crate::syntax::TextLine;

/// The answer for one target line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentationDecision {
    /// Indentation of `anchor_line` plus `extra_units` indent units.
    Follow { anchor_line: TextLine, extra_units: u32 },
    /// A fixed column.
    Absolute(u32),
    /// Keep the literal indentation of the nearest preceding non-blank line.
    Inherit,
    /// The engine declines; the caller applies its own default.
    NoOpinion,
}

impl IndentationDecision {
    /// Short name used in logs and over the wire.
    pub fn kind_name(&self) -> &'static str {
        match self {
            IndentationDecision::Follow { .. } => "follow",
            IndentationDecision::Absolute(_) => "absolute",
            IndentationDecision::Inherit => "inherit",
            IndentationDecision::NoOpinion => "noOpinion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndentError {
    #[error("line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange { line: u32, line_count: u32 },
    #[error("indentation request was cancelled")]
    Cancelled,
}
