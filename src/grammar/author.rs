//! Author-name parsing: turning the author run of a citation into ordered
//! [`AuthorName`] values.
//!
//! Bibliographies mix `Last, F.`, `F. Last`, `Last, FirstName`, trailing
//! initials (`Ong C.S.`), and bare surnames; the splitter additionally has to
//! tell apart commas that separate authors from the comma inside a single
//! `Last, F.` pair.

use crate::AuthorName;
use crate::utils::collapse_whitespace;
use compact_str::CompactString;

/// Parse one author segment into an [`AuthorName`]. Returns `None` for
/// fragments too short or too symbol-laden to be a name.
pub(crate) fn parse_author(raw: &str) -> Option<AuthorName> {
    let cleaned = collapse_whitespace(raw).trim_matches([',', ';', ':']).trim().to_string();
    if cleaned.len() < 2 || !cleaned.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    // "Last, Given" / "Last, F."
    if let Some((last, given)) = cleaned.split_once(',') {
        let last = last.trim();
        let given = given.trim();
        if last.is_empty() {
            return None;
        }
        return Some(AuthorName {
            raw: cleaned.clone(),
            last: Some(last.to_string()),
            first_initials: initials_of(given).map(String::from),
        });
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    // "N. Wiener", "D. R. Hill": dotted initials first, surname after.
    let leading_initials = tokens
        .iter()
        .take_while(|t| is_dotted_initial(t))
        .count();
    if leading_initials > 0 && leading_initials < tokens.len() {
        let last = tokens[leading_initials..].join(" ");
        let initials: CompactString = tokens[..leading_initials]
            .iter()
            .flat_map(|t| t.chars().filter(|c| c.is_ascii_uppercase()))
            .collect();
        return Some(AuthorName {
            raw: cleaned.clone(),
            last: Some(last),
            first_initials: Some(initials.into()),
        });
    }

    // "Ong C.S.": surname first, initials trailing.
    if tokens.len() == 2 && is_dotted_initial(tokens[1]) {
        let initials: CompactString = tokens[1]
            .chars()
            .filter(|c| c.is_ascii_uppercase())
            .collect();
        return Some(AuthorName {
            raw: cleaned.clone(),
            last: Some(tokens[0].to_string()),
            first_initials: Some(initials.into()),
        });
    }

    // "Alan Turing" or a bare surname: the final token is the best surname
    // guess; earlier tokens contribute initials.
    let last = tokens.last().map(|t| t.to_string());
    let first_initials = if tokens.len() > 1 {
        initials_of(&tokens[..tokens.len() - 1].join(" ")).map(String::from)
    } else {
        None
    };
    Some(AuthorName {
        raw: cleaned,
        last,
        first_initials,
    })
}

/// Split a full author run (the text before the year parenthetical) into
/// ordered authors. Semicolons are the primary separator, ` & ` and ` and `
/// secondary; remaining comma-separated tokens are paired back into
/// `Last, F.` authors where the shapes line up.
pub(crate) fn split_author_run(run: &str) -> Vec<AuthorName> {
    let mut authors = Vec::new();
    for segment in run.split(';') {
        for sub in segment.split(" & ").flat_map(|p| p.split(" and ")) {
            pair_comma_tokens(sub, &mut authors);
        }
    }
    authors
}

fn pair_comma_tokens(text: &str, out: &mut Vec<AuthorName>) {
    let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.is_empty() {
            i += 1;
            continue;
        }
        if let Some(next) = tokens.get(i + 1)
            && looks_like_surname(token)
            && looks_like_given(next)
        {
            if let Some(author) = parse_author(&format!("{token}, {next}")) {
                out.push(author);
            }
            i += 2;
            continue;
        }
        if let Some(author) = parse_author(token) {
            out.push(author);
        }
        i += 1;
    }
}

/// Whether a given-name string is an initials abbreviation (`J.`, `J.J.`,
/// `L. J. P.`) rather than a spelled-out name.
pub(crate) fn given_is_initials(given: &str) -> bool {
    let letters: Vec<char> = given.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty()
        && letters.len() <= 4
        && letters.iter().all(|c| c.is_uppercase())
        && given.chars().all(|c| c.is_alphabetic() || c == '.' || c == ' ')
}

/// Whether the run opens with dotted initials (`N. Wiener` style).
pub(crate) fn starts_with_initials(run: &str) -> bool {
    run.split_whitespace()
        .next()
        .is_some_and(is_dotted_initial)
}

fn is_dotted_initial(token: &str) -> bool {
    let letters = token.chars().filter(|c| c.is_ascii_uppercase()).count();
    letters >= 1
        && letters <= 4
        && token.contains('.')
        && token.chars().all(|c| c.is_ascii_uppercase() || c == '.')
}

fn looks_like_surname(token: &str) -> bool {
    let words = token.split_whitespace().count();
    !token.is_empty()
        && words <= 4
        && token.chars().next().is_some_and(|c| c.is_uppercase())
        && token
            .chars()
            .all(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '\u{2019}' | '-'))
}

fn looks_like_given(token: &str) -> bool {
    if given_is_initials(token) {
        return true;
    }
    // A single short capitalized word ("Alan", "Kai") reads as a first name.
    token.len() <= 10
        && !token.contains(' ')
        && token.chars().next().is_some_and(|c| c.is_uppercase())
        && token.chars().skip(1).all(|c| c.is_lowercase() || c == '-')
}

fn initials_of(given: &str) -> Option<CompactString> {
    let initials: CompactString = given
        .split(|c: char| c == ' ' || c == '.' || c == '-')
        .filter_map(|part| part.chars().next())
        .filter(|c| c.is_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    (!initials.is_empty()).then_some(initials)
}
