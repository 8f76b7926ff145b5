//! Text stream normalization: the first pipeline stage.
//!
//! Takes the raw per-page text from the extraction service and produces one
//! cleaned, ordered line stream: running headers/footers and page numbers are
//! removed, hyphen-broken words are rejoined across line (and page) breaks,
//! whitespace runs are collapsed, and chapter-marker lines are tagged with
//! their [`ChapterId`]. A pure transform; the only side channel is the shared
//! diagnostics list.

use crate::config::ParserConfig;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::utils::{collapse_whitespace, expand_ligatures};
use crate::{ChapterId, RawPage};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// One cleaned line of the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLine {
    pub text: String,
    /// Set when this line is a chapter marker; marker lines carry structure,
    /// not bibliography content.
    pub chapter_marker: Option<ChapterId>,
}

/// The whole document as a single ordered line stream.
///
/// Invariants: line order matches the original document order, and no two
/// adjacent lines hold the halves of a hyphen-split word (the normalizer has
/// joined them).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub lines: Vec<NormalizedLine>,
}

impl NormalizedDocument {
    /// True when no text survived normalization.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.text.trim().is_empty())
    }

    /// All non-marker text joined by newlines. The chapter partition
    /// invariant says the concatenation of all chapter blocks reconstructs
    /// exactly this string.
    pub fn non_marker_text(&self) -> String {
        self.lines
            .iter()
            .filter(|l| l.chapter_marker.is_none())
            .map(|l| l.text.as_str())
            .join("\n")
    }
}

/// Frequency accumulator for duplicate-line elimination, built in one pass
/// and applied in a second; all cross-page state lives here, not in the
/// emit loop. Keys are digit-stripped, case-folded line texts, so a running
/// header recurs into the same bucket regardless of page number.
struct BoilerplateIndex {
    buckets: Vec<(String, BTreeSet<u32>)>,
    similarity: f64,
}

impl BoilerplateIndex {
    fn build(pages: &[RawPage], config: &ParserConfig) -> Self {
        let mut index = BoilerplateIndex {
            buckets: Vec::new(),
            similarity: config.header_similarity,
        };
        for page in pages {
            for raw_line in page.text.lines() {
                let line = collapse_whitespace(&expand_ligatures(raw_line));
                if line.is_empty() || is_exempt(&line, config) {
                    continue;
                }
                let key = boilerplate_key(&line);
                match index.bucket_of(&key) {
                    Some(i) => {
                        index.buckets[i].1.insert(page.index);
                    }
                    None => {
                        index.buckets.push((key, BTreeSet::from([page.index])));
                    }
                }
            }
        }
        index
    }

    fn bucket_of(&self, key: &str) -> Option<usize> {
        self.buckets.iter().position(|(existing, _)| {
            existing == key || strsim::jaro_winkler(existing, key) >= self.similarity
        })
    }

    /// Whether a (non-exempt) line recurs on enough distinct pages to count
    /// as a running header/footer or page number.
    fn is_boilerplate(&self, line: &str, recurrence: usize) -> bool {
        self.bucket_of(&boilerplate_key(line))
            .is_some_and(|i| self.buckets[i].1.len() >= recurrence)
    }
}

/// Lines that must never be treated as boilerplate no matter how often they
/// recur: anything carrying a citation-key anchor or a chapter marker.
fn is_exempt(line: &str, config: &ParserConfig) -> bool {
    config.citation_key.is_match(line) || config.chapter_marker.is_match(line)
}

fn boilerplate_key(line: &str) -> String {
    let without_digits: String = line.chars().filter(|c| !c.is_ascii_digit()).collect();
    collapse_whitespace(&without_digits).to_lowercase()
}

/// Normalize raw pages into a single cleaned line stream.
pub(crate) fn normalize(
    pages: &[RawPage],
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> NormalizedDocument {
    if pages.iter().all(|p| p.text.trim().is_empty()) {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptyInput,
            format!("no extractable text in {} page(s)", pages.len()),
        ));
        return NormalizedDocument::default();
    }

    let index = BoilerplateIndex::build(pages, config);

    let mut lines: Vec<String> = Vec::new();
    let mut removed = 0usize;
    for page in pages {
        for raw_line in page.text.lines() {
            let line = collapse_whitespace(&expand_ligatures(raw_line));
            if line.is_empty() {
                // Keep a single blank separator; runs of blanks carry no
                // extra information.
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(String::new());
                }
                continue;
            }
            if !is_exempt(&line, config) && index.is_boilerplate(&line, config.header_recurrence) {
                removed += 1;
                continue;
            }
            lines.push(line);
        }
        // No separator at page boundaries: entries flow across page breaks.
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    debug!(removed, kept = lines.len(), "boilerplate elimination done");

    join_hyphenated(&mut lines, config);

    let lines = lines
        .into_iter()
        .map(|text| {
            let chapter_marker = match config.chapter_marker.captures(&text) {
                Some(caps) => match caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                    Some(number) => Some(ChapterId(number)),
                    None => {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::MalformedChapterMarker,
                            format!("marker line {text:?} has no parsable chapter number"),
                        ));
                        None
                    }
                },
                None => None,
            };
            NormalizedLine {
                text,
                chapter_marker,
            }
        })
        .collect();

    NormalizedDocument { lines }
}

/// Merge a line ending in a word-break hyphen with the leading token of the
/// following line. Compound words (and hyphens after digits, as in model
/// names) keep their hyphen; syllable breaks lose it.
fn join_hyphenated(lines: &mut Vec<String>, config: &ParserConfig) {
    let mut i = 0;
    while i < lines.len() {
        let joinable = ends_with_break_hyphen(&lines[i])
            && lines.get(i + 1).is_some_and(|next| !next.is_empty());
        if !joinable {
            i += 1;
            continue;
        }

        let next = std::mem::take(&mut lines[i + 1]);
        let (token, rest) = match next.split_once(' ') {
            Some((token, rest)) => (token.to_string(), rest.trim_start().to_string()),
            None => (next, String::new()),
        };

        let keep_hyphen = {
            let stem = &lines[i];
            let before_hyphen = stem[..stem.len() - 1].chars().next_back();
            before_hyphen.is_some_and(|c| c.is_ascii_digit()) || config.is_compound_suffix(&token)
        };
        if !keep_hyphen {
            lines[i].pop();
        }
        lines[i].push_str(&token);

        if rest.is_empty() {
            lines.remove(i + 1);
        } else {
            lines[i + 1] = rest;
        }
        // Do not advance: the joined line may itself end in a hyphen.
    }
}

fn ends_with_break_hyphen(line: &str) -> bool {
    let mut rev = line.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(|c| c.is_alphanumeric())
}
