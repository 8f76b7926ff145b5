//! Final assembly: one [`CitationRecord`] per surviving raw entry.
//!
//! The assembler is the only stateful stage — it owns the run-scoped record
//! counter and the `max_refs` cap — and it is deliberately infallible:
//! entries that matched no grammar are still emitted (tagged `Unmatched`,
//! confidence 0.0) so parse-coverage accounting downstream reflects reality.

use crate::boundary::RawEntry;
use crate::config::ParserConfig;
use crate::error::{Diagnostic, DiagnosticKind, SourceSpan};
use crate::grammar::ParsedFields;
use crate::utils::year_from_citation_key;
use crate::{CitationRecord, GrammarTag};
use tracing::debug;

pub(crate) struct Assembler {
    next_id: u64,
    cap: Option<u64>,
    cap_reported: bool,
}

impl Assembler {
    pub(crate) fn new(config: &ParserConfig) -> Self {
        Assembler {
            next_id: 0,
            cap: config.max_refs.map(u64::from),
            cap_reported: false,
        }
    }

    /// Build the record for one entry, or `None` once the `max_refs` cap is
    /// reached.
    pub(crate) fn assemble(
        &mut self,
        entry: RawEntry,
        fields: ParsedFields,
        config: &ParserConfig,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<CitationRecord> {
        if self.cap.is_some_and(|cap| self.next_id >= cap) {
            if !self.cap_reported {
                debug!(cap = self.cap, "max_refs cap reached; remaining entries skipped");
                self.cap_reported = true;
            }
            return None;
        }

        if fields.grammar_tag == GrammarTag::Unmatched {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::UnmatchedEntry,
                    match &entry.citation_key {
                        Some(key) => format!("entry [{key}] matched no citation grammar"),
                        None => "entry matched no citation grammar".to_string(),
                    },
                )
                .in_chapter(entry.chapter_id)
                .with_span(SourceSpan::new(entry.start_offset, entry.end_offset)),
            );
        }

        // The grammar matchers only honor parenthesized years; a key like
        // `Hill '79` still dates the entry when they come up empty.
        let year = fields.year.or_else(|| {
            entry
                .citation_key
                .as_deref()
                .and_then(|key| year_from_citation_key(key, config.plausible_year_range()))
        });

        let first_author = fields.authors.first().cloned();
        let last_author = if fields.authors.len() > 1 {
            fields.authors.last().cloned()
        } else {
            // None signals "same as first" to downstream consumers.
            None
        };

        let record = CitationRecord {
            record_id: self.next_id,
            chapter_id: entry.chapter_id,
            citation_key: entry.citation_key,
            first_author,
            last_author,
            title: fields.title,
            year,
            venue: fields.venue,
            grammar_tag: fields.grammar_tag,
            parse_confidence: config.confidence.for_tag(fields.grammar_tag),
        };
        self.next_id += 1;
        Some(record)
    }
}
