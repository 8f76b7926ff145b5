//! Chapter segmentation: partition the normalized line stream into
//! chapter-scoped bibliography blocks.
//!
//! Every marker line opens a new chapter and closes the previous one; text
//! before the first marker becomes the implicit front-matter block and is
//! never discarded. Two markers with fewer than the configured number of
//! content lines between them indicate a false positive (a continuation or
//! table-of-contents artifact): the earlier marker is suppressed and
//! reported. A document with no markers at all degrades to a single block.

use crate::config::ParserConfig;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::normalize::NormalizedDocument;
use crate::ChapterId;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One chapter's worth of bibliography text.
///
/// Blocks are contiguous, non-overlapping partitions of the normalized
/// document's non-marker text, ordered by first appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterBlock {
    pub chapter_id: ChapterId,
    /// Display text of the opening marker (`Chapter 3`); `None` for the
    /// front-matter block.
    pub chapter_title: Option<String>,
    pub raw_text: String,
}

struct OpenBlock {
    id: ChapterId,
    title: Option<String>,
    lines: Vec<String>,
    opened_by_marker: bool,
}

impl OpenBlock {
    fn front_matter() -> Self {
        OpenBlock {
            id: ChapterId::FRONT_MATTER,
            title: None,
            lines: Vec::new(),
            opened_by_marker: false,
        }
    }

    fn content_lines(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_empty()).count()
    }

    fn close(self) -> ChapterBlock {
        ChapterBlock {
            chapter_id: self.id,
            chapter_title: self.title,
            raw_text: self.lines.iter().join("\n"),
        }
    }
}

/// Split the normalized document into ordered chapter blocks.
pub(crate) fn segment(
    doc: &NormalizedDocument,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ChapterBlock> {
    let mut closed: Vec<OpenBlock> = Vec::new();
    let mut current = OpenBlock::front_matter();

    for line in &doc.lines {
        let Some(id) = line.chapter_marker else {
            current.lines.push(line.text.clone());
            continue;
        };

        if current.opened_by_marker && current.content_lines() < config.min_chapter_gap_lines {
            // False-positive marker: too little content since it opened.
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedChapterMarker,
                format!(
                    "suppressed marker for {} ({} intervening content line(s), need {})",
                    current.id,
                    current.content_lines(),
                    config.min_chapter_gap_lines
                ),
            ));
            // Whatever stray lines it held flow back to the preceding block
            // so the chapter partition stays gap-free.
            let stray = std::mem::take(&mut current.lines);
            match closed.last_mut() {
                Some(prev) => prev.lines.extend(stray),
                None if !stray.is_empty() => {
                    let mut front = OpenBlock::front_matter();
                    front.lines = stray;
                    closed.push(front);
                }
                None => {}
            }
        } else if current.opened_by_marker || current.content_lines() > 0 {
            closed.push(current);
        }

        current = OpenBlock {
            id,
            title: marker_title(&line.text),
            lines: Vec::new(),
            opened_by_marker: true,
        };
    }

    if current.opened_by_marker || current.content_lines() > 0 {
        closed.push(current);
    }

    let blocks: Vec<ChapterBlock> = closed.into_iter().map(OpenBlock::close).collect();
    debug!(chapters = blocks.len(), "segmentation done");
    blocks
}

fn marker_title(text: &str) -> Option<String> {
    let inner = text
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '—' | '–' | '―' | '-'))
        .to_string();
    (!inner.is_empty()).then_some(inner)
}
