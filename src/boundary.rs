//! Entry boundary detection within a chapter block.
//!
//! Citation-key anchors (`[Smith '23]`) are the primary boundary signal: an
//! entry spans from its anchor to the start of the next accepted anchor or
//! the end of the block. A key-shaped token quoted mid-sentence is not a
//! boundary; anchors are only accepted at a paragraph/line start or within a
//! small lookback window of one. Chapters with no anchors at all fall back
//! to blank-line-delimited paragraphs.

use crate::config::ParserConfig;
use crate::error::{Diagnostic, DiagnosticKind, SourceSpan};
use crate::segment::ChapterBlock;
use crate::utils::collapse_whitespace;
use either::Either;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One raw bibliography entry carved out of a chapter block.
///
/// `start_offset`/`end_offset` are byte offsets into the owning chapter's
/// `raw_text`; entries are contiguous and offsets strictly increase.
/// `raw_text` holds the entry body with the anchor token stripped (the key,
/// when present, lives in `citation_key` without its brackets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub chapter_id: crate::ChapterId,
    pub citation_key: Option<String>,
    pub raw_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

struct Segment {
    key: Option<String>,
    start: usize,
    body_start: usize,
    end: usize,
}

/// Detect the ordered entries of one chapter block.
pub(crate) fn detect_entries(
    block: &ChapterBlock,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<RawEntry> {
    let text = block.raw_text.as_str();
    let anchors = accepted_anchors(text, config);

    let segments = if anchors.is_empty() {
        debug!(chapter = %block.chapter_id, "no anchors; paragraph fallback");
        Either::Right(paragraph_segments(text))
    } else {
        if anchors[0].1 > 0 && !text[..anchors[0].1].trim().is_empty() {
            debug!(
                chapter = %block.chapter_id,
                "ignoring {} byte(s) of pre-anchor text",
                anchors[0].1
            );
        }
        Either::Left(anchor_segments(text.len(), anchors))
    };

    let mut entries = Vec::new();
    for seg in segments {
        let body = collapse_whitespace(&text[seg.body_start..seg.end]);
        if body.is_empty() {
            if let Some(key) = &seg.key {
                warn!(chapter = %block.chapter_id, key = %key, "anchor without body text dropped");
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::DroppedEmptyEntry,
                        format!("anchor [{key}] has no body text"),
                    )
                    .in_chapter(block.chapter_id)
                    .with_span(SourceSpan::new(seg.start, seg.end)),
                );
            }
            continue;
        }
        entries.push(RawEntry {
            chapter_id: block.chapter_id,
            citation_key: seg.key,
            raw_text: body,
            start_offset: seg.start,
            end_offset: seg.end,
        });
    }
    entries
}

/// All anchor occurrences that pass the entry-initial test, as
/// `(key, match_start, match_end)` triples in document order.
fn accepted_anchors(text: &str, config: &ParserConfig) -> Vec<(String, usize, usize)> {
    config
        .citation_key
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if !anchor_is_entry_initial(text, whole.start(), config.anchor_lookback) {
                debug!(anchor = whole.as_str(), "mid-sentence anchor suppressed");
                return None;
            }
            let key = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| whole.as_str().trim_matches(['[', ']']).trim().to_string());
            Some((key, whole.start(), whole.end()))
        })
        .collect()
}

/// An anchor is entry-initial when only whitespace separates it from the
/// start of its line, or when a line break sits within `lookback` bytes
/// before it.
fn anchor_is_entry_initial(text: &str, start: usize, lookback: usize) -> bool {
    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &text[line_start..start];
    prefix.trim().is_empty() || start - line_start <= lookback
}

fn anchor_segments(
    text_len: usize,
    anchors: Vec<(String, usize, usize)>,
) -> impl Iterator<Item = Segment> {
    let next_starts: Vec<usize> = anchors
        .iter()
        .skip(1)
        .map(|a| a.1)
        .chain([text_len])
        .collect();
    anchors
        .into_iter()
        .zip(next_starts)
        .map(|((key, start, body_start), end)| Segment {
            key: Some(key),
            start,
            body_start,
            end,
        })
}

/// Fallback strategy: each blank-line-delimited paragraph is a candidate
/// entry with no citation key.
fn paragraph_segments(text: &str) -> impl Iterator<Item = Segment> + '_ {
    let mut offset = 0;
    text.split("\n\n").filter_map(move |para| {
        let start = offset;
        offset += para.len() + 2;
        (!para.trim().is_empty()).then(|| Segment {
            key: None,
            start,
            body_start: start,
            end: start + para.len(),
        })
    })
}
