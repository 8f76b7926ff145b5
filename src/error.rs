//! Error and diagnostic types for the parsing pipeline.
//!
//! The pipeline itself never fails: every condition short of a programmer
//! error is reported as a [`Diagnostic`] collected alongside the output
//! records, so the caller can inspect parse coverage before spending money
//! on downstream enrichment. The only `Result`-propagated error in the crate
//! is [`ConfigError`], raised while building a [`crate::ParserConfig`] —
//! strictly before any parsing begins.

use crate::ChapterId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A byte-offset span into a chapter's `raw_text`.
///
/// Both `start` and `end` are byte offsets (not character indices); `start`
/// is inclusive, `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl SourceSpan {
    /// Create a new `SourceSpan`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Error raised while validating and compiling a parser configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {name} pattern: {message}")]
    Pattern {
        /// Which configuration pattern failed to compile.
        name: &'static str,
        /// Compile error reported by the regex engine.
        message: String,
    },

    #[error("plausible year range is empty: {start}..={end}")]
    EmptyYearRange { start: u16, end: u16 },

    #[error("confidence policy violates tier ordering: {detail}")]
    ConfidenceOrdering { detail: String },
}

/// The kind of a non-fatal condition observed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// No extractable text on any input page; the run produced zero chapters.
    EmptyInput,
    /// An entry fell through every grammar matcher and was emitted with the
    /// `Unmatched` tag.
    UnmatchedEntry,
    /// A chapter marker was suppressed as a false positive (e.g. a
    /// table-of-contents artifact immediately followed by another marker).
    MalformedChapterMarker,
    /// A citation-key anchor had no body text after it; the entry was
    /// excluded from the output.
    DroppedEmptyEntry,
}

impl DiagnosticKind {
    /// Short stable name, useful for logs and report footers.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::EmptyInput => "empty-input",
            DiagnosticKind::UnmatchedEntry => "unmatched-entry",
            DiagnosticKind::MalformedChapterMarker => "malformed-chapter-marker",
            DiagnosticKind::DroppedEmptyEntry => "dropped-empty-entry",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single non-fatal condition observed during a run.
///
/// Diagnostics are data, not control flow: they are accumulated in document
/// order and returned in [`crate::ParseOutcome::diagnostics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Chapter the condition was observed in, when chapter context exists.
    pub chapter: Option<ChapterId>,
    /// Human-readable description of the condition.
    pub message: String,
    /// Byte span into the owning chapter's `raw_text`, when one applies.
    pub span: Option<SourceSpan>,
}

impl Diagnostic {
    /// Create a diagnostic without chapter or span context.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            chapter: None,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a chapter id (builder style).
    pub fn in_chapter(mut self, chapter: ChapterId) -> Self {
        self.chapter = Some(chapter);
        self
    }

    /// Attach a byte-offset span (builder style).
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.chapter {
            Some(chapter) => write!(f, "[{}] {}: {}", self.kind, chapter, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_display_with_chapter() {
        let diag = Diagnostic::new(DiagnosticKind::DroppedEmptyEntry, "anchor [Lee '19a] has no body")
            .in_chapter(ChapterId(3));
        assert_eq!(
            diag.to_string(),
            "[dropped-empty-entry] Chapter 3: anchor [Lee '19a] has no body"
        );
    }

    #[test]
    fn test_diagnostic_display_without_chapter() {
        let diag = Diagnostic::new(DiagnosticKind::EmptyInput, "no extractable text in 4 pages");
        assert_eq!(diag.to_string(), "[empty-input] no extractable text in 4 pages");
    }

    #[test]
    fn test_diagnostic_span_builder() {
        let diag = Diagnostic::new(DiagnosticKind::UnmatchedEntry, "entry did not match any grammar")
            .with_span(SourceSpan::new(10, 42));
        assert_eq!(diag.span, Some(SourceSpan { start: 10, end: 42 }));
    }

    #[test]
    fn test_kind_names_are_stable() {
        assert_eq!(DiagnosticKind::EmptyInput.as_str(), "empty-input");
        assert_eq!(
            DiagnosticKind::MalformedChapterMarker.as_str(),
            "malformed-chapter-marker"
        );
    }
}
