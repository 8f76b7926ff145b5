//! Pretty diagnostic rendering using [ariadne].
//!
//! Turns the per-run [`Diagnostic`] list into human-readable reports with
//! source context and underlines. Only compiled when the `diagnostics`
//! Cargo feature is enabled:
//!
//! ```toml
//! [dependencies]
//! bibextract = { version = "0.1", features = ["diagnostics"] }
//! ```
//!
//! The `source` argument is the text the diagnostic's span points into —
//! for entry-level diagnostics that is the owning chapter's `raw_text`.

use crate::error::Diagnostic;

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
impl Diagnostic {
    /// Render this diagnostic as an Ariadne report over `source`.
    ///
    /// The returned `String` contains ANSI colour codes when the terminal
    /// supports them.
    ///
    /// # Arguments
    ///
    /// * `filename` – Label shown in the report header (e.g. the PDF name).
    /// * `source`   – The chapter text the span points into.
    pub fn to_report(&self, filename: &str, source: &str) -> String {
        let mut buf = Vec::new();

        let range = self.primary_byte_range(source);
        let mut report = Report::build(ReportKind::Warning, (filename, range.clone()))
            .with_message(self.to_string());

        report = report.with_label(
            Label::new((filename, range))
                .with_message(self.kind.as_str())
                .with_color(Color::Yellow),
        );

        report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Byte range into `source` best representing the diagnostic location:
    /// the explicit span when one exists, otherwise the start of the text.
    fn primary_byte_range(&self, source: &str) -> std::ops::Range<usize> {
        match &self.span {
            Some(span) => span.start..span.end.min(source.len()),
            None => 0..0,
        }
    }
}

#[cfg(all(test, feature = "diagnostics"))]
mod tests {
    use crate::error::{Diagnostic, DiagnosticKind, SourceSpan};

    #[test]
    fn test_to_report_with_span() {
        let source = "[Lee '19a]\n[Lee '19b] Lee, K. (2019). Real entry. Venue.";
        let diag = Diagnostic::new(DiagnosticKind::DroppedEmptyEntry, "anchor has no body")
            .with_span(SourceSpan::new(0, 10));
        let rendered = diag.to_report("refs.pdf", source);
        assert!(rendered.contains("refs.pdf"));
    }

    #[test]
    fn test_to_report_without_span() {
        let diag = Diagnostic::new(DiagnosticKind::EmptyInput, "no extractable text");
        let rendered = diag.to_report("refs.pdf", "");
        assert!(rendered.contains("no extractable text"));
    }

    #[test]
    fn test_to_report_span_clamped_to_source() {
        let diag = Diagnostic::new(DiagnosticKind::UnmatchedEntry, "unmatched")
            .with_span(SourceSpan::new(2, 9999));
        // Must not panic on a span wider than the source.
        let rendered = diag.to_report("refs.pdf", "short text");
        assert!(rendered.contains("unmatched"));
    }
}
