//! The grammar matchers, one per citation format.
//!
//! Every matcher is a pure function `(&str, &ParserConfig) -> Option<ParsedFields>`;
//! `None` means "not my grammar, try the next one". Matchers for grammars
//! earlier in the priority order explicitly reject the distinguishing
//! markers of later ones (elision, `Translated by`) so that specificity
//! ordering is decided here, per matcher, rather than by accident of regex
//! greediness.

use super::ParsedFields;
use super::author::{parse_author, split_author_run, starts_with_initials, given_is_initials};
use crate::GrammarTag;
use crate::config::ParserConfig;
use crate::regex::Regex;
use crate::utils::{ParenYear, find_paren_year, year_in_range};
use std::sync::LazyLock;

static ELLIPSIS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{3}|\u{2026}").unwrap());

static ET_AL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bet\s+al\b").unwrap());

static TRANSLATED_BY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)translated\s+by\s+([^()]+?)\s*\((\d{4})\)").unwrap());

static TRANSLATION_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:translated|edited)\s+by\b").unwrap());

static PARENTHETICAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// Longest author run we are willing to believe; anything longer is title
/// or sentence text that happens to precede a year.
const MAX_AUTHOR_RUN: usize = 200;

/// `Last, F.; Last, F. (YYYY). Title. Venue.`
pub(super) fn match_semicolon(text: &str, config: &ParserConfig) -> Option<ParsedFields> {
    let (run, year) = author_run(text, config)?;
    if !run.contains(';') || has_elision(run) {
        return None;
    }
    let authors = split_author_run(run);
    if authors.is_empty() {
        return None;
    }
    let (title, venue) = title_and_venue(text, year.end);
    Some(ParsedFields {
        authors,
        elided_middle_authors: false,
        translator: None,
        title,
        year: Some(year.year),
        venue,
        grammar_tag: GrammarTag::Semicolon,
    })
}

/// `Last, F., Last, F., & Last, F. (YYYY). Title. Venue.` — also accepts a
/// single author when the given name is an initials abbreviation
/// (`Smith, J.` or `N. Wiener`); a lone full-named author belongs to the
/// full-name grammar further down the list.
pub(super) fn match_standard(text: &str, config: &ParserConfig) -> Option<ParsedFields> {
    let (run, year) = author_run(text, config)?;
    if run.contains(';') || has_elision(run) {
        return None;
    }
    let authors = split_author_run(run);
    let single_is_abbreviated = match run.split_once(',') {
        Some((_, given)) => given_is_initials(given.trim()),
        None => starts_with_initials(run),
    };
    if authors.is_empty() || (authors.len() == 1 && !single_is_abbreviated) {
        return None;
    }
    let (title, venue) = title_and_venue(text, year.end);
    Some(ParsedFields {
        authors,
        elided_middle_authors: false,
        translator: None,
        title,
        year: Some(year.year),
        venue,
        grammar_tag: GrammarTag::Standard,
    })
}

/// `Last, F., ... & Last, F. (YYYY).` — first and last author captured, the
/// elided middle authors marked explicitly rather than invented.
pub(super) fn match_et_al(text: &str, config: &ParserConfig) -> Option<ParsedFields> {
    let (run, year) = author_run(text, config)?;
    let (before, after) = elision_split(run)?;

    let mut authors = Vec::new();
    if let Some(first) = split_author_run(before).into_iter().next() {
        authors.push(first);
    }
    let after = after
        .trim_start_matches([',', '.', '&', ' '])
        .trim_start_matches("and ")
        .trim();
    if !after.is_empty() {
        authors.extend(split_author_run(after));
    }
    if authors.is_empty() {
        return None;
    }
    let (title, venue) = title_and_venue(text, year.end);
    Some(ParsedFields {
        authors,
        elided_middle_authors: true,
        translator: None,
        title,
        year: Some(year.year),
        venue,
        grammar_tag: GrammarTag::EtAl,
    })
}

/// `OriginalAuthor. Title. Translated by Translator (YYYY).` — the original
/// author is the first author; the translator is captured separately and
/// never conflated with the author list.
pub(super) fn match_translation(text: &str, config: &ParserConfig) -> Option<ParsedFields> {
    let caps = TRANSLATED_BY_REGEX.captures(text)?;
    let year: u16 = caps.get(2)?.as_str().parse().ok()?;
    if !year_in_range(year, config.plausible_year_range()) {
        return None;
    }
    let marker_start = caps.get(0)?.start();
    let first_period = text.find('.')?;
    if first_period >= marker_start {
        return None;
    }

    let head = PARENTHETICAL_REGEX.replace_all(&text[..first_period], "");
    let original_author = parse_author(head.trim())?;
    let translator = parse_author(caps.get(1)?.as_str());

    let title = text[first_period + 1..marker_start]
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';'))
        .to_string();

    Some(ParsedFields {
        authors: vec![original_author],
        elided_middle_authors: false,
        translator,
        title: (!title.is_empty()).then_some(title),
        year: Some(year),
        venue: None,
        grammar_tag: GrammarTag::Translation,
    })
}

/// `LastName, FirstName (YYYY). Title.` — single author with a spelled-out
/// given name.
pub(super) fn match_full_name(text: &str, config: &ParserConfig) -> Option<ParsedFields> {
    let (run, year) = author_run(text, config)?;
    if run.contains(';') || run.contains(" & ") || has_elision(run) {
        return None;
    }
    let (_, given) = run.split_once(',')?;
    let given = given.trim();
    if given.is_empty() || given.contains(',') || given_is_initials(given) {
        return None;
    }
    let author = parse_author(run)?;
    let (title, venue) = title_and_venue(text, year.end);
    Some(ParsedFields {
        authors: vec![author],
        elided_middle_authors: false,
        translator: None,
        title,
        year: Some(year.year),
        venue,
        grammar_tag: GrammarTag::FullName,
    })
}

/// The author run is everything before the first in-range parenthesized
/// year. Rejects runs too long to be author names and runs carrying a
/// translation/edition marker (those belong to the translation grammar).
fn author_run<'t>(text: &'t str, config: &ParserConfig) -> Option<(&'t str, ParenYear)> {
    let year = find_paren_year(text, config.plausible_year_range())?;
    let run = text[..year.start]
        .trim()
        .trim_end_matches([',', ';'])
        .trim_end();
    if run.is_empty() || run.len() > MAX_AUTHOR_RUN || TRANSLATION_MARKER_REGEX.is_match(run) {
        return None;
    }
    Some((run, year))
}

fn has_elision(run: &str) -> bool {
    ELLIPSIS_REGEX.is_match(run) || ET_AL_REGEX.is_match(run)
}

/// Split the author run at the elision marker. For `A, ... & Z` both sides
/// are non-empty; for `A, B, et al.` the right side is empty.
fn elision_split(run: &str) -> Option<(&str, &str)> {
    if let Some(m) = ELLIPSIS_REGEX.find(run) {
        return Some((&run[..m.start()], &run[m.end()..]));
    }
    ET_AL_REGEX.find(run).map(|m| (&run[..m.start()], ""))
}

/// Title = the span between the year parenthetical and the next
/// sentence-terminal period; venue = the sentence after that, if any.
fn title_and_venue(text: &str, year_end: usize) -> (Option<String>, Option<String>) {
    let rest = text[year_end..]
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ':'));
    let (title, tail) = split_sentence(rest);
    let (venue, _) = split_sentence(tail);
    (non_empty(title), non_empty(venue))
}

fn split_sentence(text: &str) -> (&str, &str) {
    match text.find(". ") {
        Some(i) => (&text[..i], text[i + 1..].trim_start()),
        None => (text.trim_end_matches('.'), ""),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim().trim_end_matches('.').trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn test_semicolon_grammar() {
        let fields = match_semicolon(
            "Van der Maaten, L.J.P.; Hinton, G.E. (2008). Visualizing Data Using t-SNE. Journal of Machine Learning Research. 9: 2579-2605.",
            &config(),
        )
        .unwrap();
        assert_eq!(fields.grammar_tag, GrammarTag::Semicolon);
        assert_eq!(fields.year, Some(2008));
        assert_eq!(fields.authors.len(), 2);
        assert_eq!(fields.authors[0].last.as_deref(), Some("Van der Maaten"));
        assert_eq!(fields.title.as_deref(), Some("Visualizing Data Using t-SNE"));
        assert_eq!(
            fields.venue.as_deref(),
            Some("Journal of Machine Learning Research")
        );
    }

    #[test]
    fn test_standard_grammar_multi_author() {
        let fields = match_standard(
            "Chen, T., Kornblith, S., Norouzi, M., & Hinton, G. (2020). A simple framework for contrastive learning of visual representations. International conference on machine learning. PMLR.",
            &config(),
        )
        .unwrap();
        assert_eq!(fields.grammar_tag, GrammarTag::Standard);
        assert_eq!(fields.authors.len(), 4);
        assert_eq!(fields.year, Some(2020));
        assert_eq!(
            fields.title.as_deref(),
            Some("A simple framework for contrastive learning of visual representations")
        );
    }

    #[test]
    fn test_standard_grammar_single_abbreviated_author() {
        let fields = match_standard(
            "N. Wiener (1948). Time, communication, and the nervous system. Teleological mechanisms.",
            &config(),
        )
        .unwrap();
        assert_eq!(fields.authors.len(), 1);
        assert_eq!(fields.authors[0].last.as_deref(), Some("Wiener"));
        assert_eq!(fields.year, Some(1948));
    }

    #[test]
    fn test_standard_rejects_full_named_single_author() {
        assert!(
            match_standard(
                "Turing, Alan (1950). Computing machinery and intelligence. Mind.",
                &config()
            )
            .is_none()
        );
    }

    #[test]
    fn test_standard_rejects_elision() {
        assert!(
            match_standard(
                "Ayer, A., ... & Zed, Z. (2001). Some title. Venue.",
                &config()
            )
            .is_none()
        );
    }

    #[test]
    fn test_et_al_grammar_with_ellipsis() {
        let fields = match_et_al(
            "Ayer, A., ... & Zed, Z. (2001). Some collaborative title. Venue.",
            &config(),
        )
        .unwrap();
        assert_eq!(fields.grammar_tag, GrammarTag::EtAl);
        assert!(fields.elided_middle_authors);
        assert_eq!(fields.authors.len(), 2);
        assert_eq!(fields.authors[0].last.as_deref(), Some("Ayer"));
        assert_eq!(fields.authors[1].last.as_deref(), Some("Zed"));
    }

    #[test]
    fn test_et_al_grammar_textual() {
        let fields = match_et_al(
            "Smith, J., et al. (1999). A many-author paper. Venue.",
            &config(),
        )
        .unwrap();
        assert!(fields.elided_middle_authors);
        assert_eq!(fields.authors.len(), 1);
        assert_eq!(fields.authors[0].last.as_deref(), Some("Smith"));
    }

    #[test]
    fn test_translation_grammar() {
        let fields = match_translation(
            "Banu Musa brothers (9th century). The book of ingenious devices (Kitab al-hiyal). Translated by D. R. Hill (1979), Springer, p. 44.",
            &config(),
        )
        .unwrap();
        assert_eq!(fields.grammar_tag, GrammarTag::Translation);
        assert_eq!(fields.year, Some(1979));
        assert_eq!(fields.authors.len(), 1);
        assert_eq!(fields.authors[0].raw, "Banu Musa brothers");
        let translator = fields.translator.unwrap();
        assert_eq!(translator.last.as_deref(), Some("Hill"));
        assert_eq!(
            fields.title.as_deref(),
            Some("The book of ingenious devices (Kitab al-hiyal)")
        );
    }

    #[test]
    fn test_translation_requires_author_sentence() {
        assert!(match_translation("Translated by D. R. Hill (1979).", &config()).is_none());
    }

    #[test]
    fn test_full_name_grammar() {
        let fields = match_full_name(
            "Turing, Alan (1950). Computing machinery and intelligence. Mind.",
            &config(),
        )
        .unwrap();
        assert_eq!(fields.grammar_tag, GrammarTag::FullName);
        assert_eq!(fields.authors.len(), 1);
        assert_eq!(fields.authors[0].last.as_deref(), Some("Turing"));
        assert_eq!(fields.title.as_deref(), Some("Computing machinery and intelligence"));
        assert_eq!(fields.venue.as_deref(), Some("Mind"));
    }

    #[test]
    fn test_full_name_rejects_initials() {
        assert!(match_full_name("Smith, J. (2023). Title. Venue.", &config()).is_none());
    }

    #[test]
    fn test_out_of_range_year_falls_through() {
        // (3023) is outside the plausible range, so no matcher may claim the
        // entry on its strength.
        let text = "Smith, J., & Doe, A. (3023). A paper from the future. Venue.";
        assert!(match_standard(text, &config()).is_none());
        assert!(match_semicolon(text, &config()).is_none());
    }

    #[test]
    fn test_semicolon_rejects_translation_marker() {
        assert!(
            match_semicolon(
                "Collected fables; annotated. Translated by A. Reader (1901).",
                &config()
            )
            .is_none()
        );
    }

    #[test]
    fn test_title_and_venue_extraction() {
        let (title, venue) = title_and_venue("(2023). A Great Paper. Journal of Tests.", 6);
        assert_eq!(title.as_deref(), Some("A Great Paper"));
        assert_eq!(venue.as_deref(), Some("Journal of Tests"));
    }

    #[test]
    fn test_title_without_venue() {
        let (title, venue) = title_and_venue("(2023). Only a title", 6);
        assert_eq!(title.as_deref(), Some("Only a title"));
        assert_eq!(venue, None);
    }
}
