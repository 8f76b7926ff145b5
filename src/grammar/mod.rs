//! Citation field parsing: an ordered set of grammar matchers.
//!
//! The six supported citation grammars are tried most-specific-first over
//! each raw entry; the first match wins and stamps its [`GrammarTag`] on the
//! result. The matcher list is a data-driven table of pure functions, so
//! adding a grammar is a local, independently testable change.
//!
//! # Example
//!
//! ```
//! use bibextract::{GrammarTag, ParserConfig, parse_fields};
//!
//! let fields = parse_fields(
//!     "Smith, J., & Doe, A. (2023). A Great Paper. Journal of Tests.",
//!     &ParserConfig::default(),
//! );
//! assert_eq!(fields.grammar_tag, GrammarTag::Standard);
//! assert_eq!(fields.year, Some(2023));
//! ```

mod author;
mod matchers;

use crate::config::ParserConfig;
use crate::utils::find_standalone_year;
use crate::{AuthorName, GrammarTag};
use serde::{Deserialize, Serialize};

/// Structured fields extracted from one raw entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFields {
    /// Ordered author list as written in the entry.
    pub authors: Vec<AuthorName>,
    /// True when the source elided middle authors (`...` or `et al.`);
    /// elided authors are marked, never invented.
    pub elided_middle_authors: bool,
    /// Translator of a translated work, kept separate from the author list.
    pub translator: Option<AuthorName>,
    pub title: Option<String>,
    pub year: Option<u16>,
    pub venue: Option<String>,
    /// Which grammar matched (or `Unmatched`).
    pub grammar_tag: GrammarTag,
}

type MatcherFn = fn(&str, &ParserConfig) -> Option<ParsedFields>;

/// The grammar table, in priority order. Order encodes specificity; the
/// first matcher to return `Some` wins.
pub(crate) const GRAMMAR_MATCHERS: [(GrammarTag, MatcherFn); 5] = [
    (GrammarTag::Semicolon, matchers::match_semicolon),
    (GrammarTag::Standard, matchers::match_standard),
    (GrammarTag::EtAl, matchers::match_et_al),
    (GrammarTag::Translation, matchers::match_translation),
    (GrammarTag::FullName, matchers::match_full_name),
];

/// Parse one raw entry's text through the grammar table.
///
/// Never fails: entries that no grammar claims come back tagged
/// [`GrammarTag::Unmatched`] with a best-effort year and empty authors.
pub fn parse_fields(text: &str, config: &ParserConfig) -> ParsedFields {
    for (tag, matcher) in GRAMMAR_MATCHERS {
        if let Some(fields) = matcher(text, config) {
            debug_assert_eq!(fields.grammar_tag, tag);
            return fields;
        }
    }
    ParsedFields {
        authors: Vec::new(),
        elided_middle_authors: false,
        translator: None,
        title: None,
        year: find_standalone_year(text, config.plausible_year_range()),
        venue: None,
        grammar_tag: GrammarTag::Unmatched,
    }
}
