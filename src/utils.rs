use crate::regex::Regex;
use std::sync::LazyLock;

/// A parenthesized publication year located inside an entry, with the byte
/// span of the whole parenthetical (used to find where the title starts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParenYear {
    pub(crate) year: u16,
    /// Inclusive start byte of the opening parenthesis.
    pub(crate) start: usize,
    /// Exclusive end byte of the closing parenthesis.
    pub(crate) end: usize,
}

static PAREN_YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // "(1948)", "(2020, January)", "(January 1, 2020)"
    Regex::new(r"\((?:[A-Za-z]+\s+\d{1,2},\s*)?(\d{4})(?:,\s*[A-Za-z]+)?\)").unwrap()
});

static STANDALONE_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

static KEY_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"['\u{2018}\u{2019}](\d{2,4})").unwrap());

/// Find the first parenthesized 4-digit year in `text` and bound-check it
/// against `range` (inclusive). An out-of-range year yields `None` so the
/// caller falls through to the next grammar.
pub(crate) fn find_paren_year(text: &str, range: (u16, u16)) -> Option<ParenYear> {
    let caps = PAREN_YEAR_REGEX.captures(text)?;
    let year: u16 = caps.get(1)?.as_str().parse().ok()?;
    if !year_in_range(year, range) {
        return None;
    }
    let whole = caps.get(0)?;
    Some(ParenYear {
        year,
        start: whole.start(),
        end: whole.end(),
    })
}

/// Best-effort search for a bare 4-digit year anywhere in `text`. Used only
/// by the unmatched fallback; returns the first in-range candidate.
pub(crate) fn find_standalone_year(text: &str, range: (u16, u16)) -> Option<u16> {
    STANDALONE_YEAR_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok())
        .find(|year| year_in_range(*year, range))
}

/// Expand a two-digit year from a citation key: `'79` → 1979, `'23` → 2023.
/// The pivot at 50 follows the convention of the keys themselves (no
/// bibliography cites the 2050s yet).
pub(crate) fn expand_two_digit_year(yy: u16) -> u16 {
    if yy > 50 { 1900 + yy } else { 2000 + yy }
}

/// Extract the year carried by a citation key like `Hill '79` or
/// `Chen '2020`. Accepts straight and curly apostrophes.
pub(crate) fn year_from_citation_key(key: &str, range: (u16, u16)) -> Option<u16> {
    let digits = KEY_YEAR_REGEX.captures(key)?.get(1)?.as_str();
    let year = match digits.len() {
        2 => expand_two_digit_year(digits.parse().ok()?),
        4 => digits.parse().ok()?,
        _ => return None,
    };
    year_in_range(year, range).then_some(year)
}

pub(crate) fn year_in_range(year: u16, (lo, hi): (u16, u16)) -> bool {
    (lo..=hi).contains(&year)
}

/// Collapse runs of whitespace (including tabs and non-breaking spaces) into
/// single ASCII spaces and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = true;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_gap {
                out.push(' ');
                in_gap = true;
            }
        } else {
            out.push(c);
            in_gap = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Expand the typographic ligatures PDF extractors commonly leave behind.
pub(crate) fn expand_ligatures(text: &str) -> String {
    if !text.chars().any(|c| ('\u{FB00}'..='\u{FB06}').contains(&c)) {
        return text.to_string();
    }
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}
