//! Parser configuration: patterns, thresholds, and the confidence policy.
//!
//! All knobs have documented defaults; [`ParserConfig::default`] is the
//! zero-setup path. Custom patterns are supplied as strings through
//! [`ParserConfigBuilder`] and compiled (and validated) once at build time —
//! after that the configuration is read-only shared state, safe to share
//! across worker threads.
//!
//! # Examples
//!
//! ```
//! use bibextract::ParserConfig;
//!
//! let config = ParserConfig::builder()
//!     .max_refs(500)
//!     .plausible_year_range(1800, 2030)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_refs(), Some(500));
//! ```

use crate::GrammarTag;
use crate::error::ConfigError;
use crate::regex::Regex;

/// Default chapter-marker pattern: a dash-repeated border flanking the word
/// "Chapter" and its number, e.g. `———— Chapter 3 ————`.
pub const DEFAULT_CHAPTER_MARKER_PATTERN: &str =
    r"(?i)^\s*[—–―-]{2,}\s*Chapter\s*(\d+)\s*[—–―-]{2,}\s*$";

/// Default citation-key pattern: bracketed short form `[LastName 'YY]` with
/// an optional letter suffix for same-author-same-year disambiguation.
/// Straight and curly apostrophes both occur in extracted text.
pub const DEFAULT_CITATION_KEY_PATTERN: &str =
    r"\[([^\[\]]+?['\u{2018}\u{2019}]\d{2,4}(?:\s*[A-Za-z])?)\]";

/// Default plausible publication years, inclusive. A deliberately generous
/// fixed bound keeps the core free of any clock dependency.
pub const DEFAULT_YEAR_RANGE: (u16, u16) = (1500, 2100);

/// Hyphenated continuations kept intact when joining line-broken words.
/// A line ending `human-` followed by `centered` keeps its hyphen; `detec-`
/// followed by `tion` loses it.
pub(crate) const DEFAULT_COMPOUND_SUFFIXES: &[&str] = &[
    "aware", "based", "centered", "class", "dependent", "driven", "free", "fold", "friendly",
    "grained", "independent", "intensive", "invariant", "level", "like", "order", "oriented",
    "poor", "related", "rich", "scale", "sensitive", "specific", "step", "style", "time", "type",
    "wise", "world",
];

/// Per-tag parse-confidence values, injected rather than hard-coded so tests
/// can assert the tier ordering without magic numbers.
///
/// The ordering invariant enforced at build time:
/// `standard ≥ et_al ≥ translation ≥ full_name > 0`, with `semicolon` on the
/// top tier alongside `standard`. `Unmatched` is always 0.0, which is what
/// makes `parse_confidence == 0.0 ⟺ Unmatched` hold for every record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    pub standard: f32,
    pub semicolon: f32,
    pub et_al: f32,
    pub translation: f32,
    pub full_name: f32,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            standard: 0.9,
            semicolon: 0.9,
            et_al: 0.75,
            translation: 0.6,
            full_name: 0.5,
        }
    }
}

impl ConfidencePolicy {
    /// Confidence assigned to a record parsed by the given grammar.
    pub fn for_tag(&self, tag: GrammarTag) -> f32 {
        match tag {
            GrammarTag::Standard => self.standard,
            GrammarTag::Semicolon => self.semicolon,
            GrammarTag::EtAl => self.et_al,
            GrammarTag::Translation => self.translation,
            GrammarTag::FullName => self.full_name,
            GrammarTag::Unmatched => 0.0,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let tiers = [
            ("standard", self.standard),
            ("semicolon", self.semicolon),
            ("et_al", self.et_al),
            ("translation", self.translation),
            ("full_name", self.full_name),
        ];
        for (name, value) in tiers {
            if !(0.0..=1.0).contains(&value) || value == 0.0 {
                return Err(ConfigError::ConfidenceOrdering {
                    detail: format!("{name} must be in (0.0, 1.0], got {value}"),
                });
            }
        }
        let ordered = self.standard >= self.et_al
            && self.semicolon >= self.et_al
            && self.et_al >= self.translation
            && self.translation >= self.full_name;
        if !ordered {
            return Err(ConfigError::ConfidenceOrdering {
                detail: format!(
                    "required standard/semicolon >= et_al >= translation >= full_name, got {self:?}"
                ),
            });
        }
        Ok(())
    }
}

/// Immutable, validated configuration for the parsing pipeline.
///
/// Construct with [`ParserConfig::default`] or [`ParserConfig::builder`].
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub(crate) max_refs: Option<u32>,
    pub(crate) chapter_marker: Regex,
    pub(crate) citation_key: Regex,
    pub(crate) year_range: (u16, u16),
    /// Minimum content lines between two chapter markers before the earlier
    /// one is treated as genuine.
    pub(crate) min_chapter_gap_lines: usize,
    /// How many bytes before an anchor a line break may sit for the anchor
    /// to still count as entry-initial.
    pub(crate) anchor_lookback: usize,
    /// A line is boilerplate once it recurs on this many distinct pages.
    pub(crate) header_recurrence: usize,
    /// Jaro-Winkler similarity above which two header candidates are
    /// considered the same line (catches page-number drift and OCR noise).
    pub(crate) header_similarity: f64,
    pub(crate) compound_suffixes: Vec<String>,
    pub(crate) confidence: ConfidencePolicy,
    pub(crate) run_in_parallel: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        // The built-in patterns are compile-time constants; failure here
        // would be a defect in the crate itself.
        Self::builder().build().expect("default configuration is valid")
    }
}

impl ParserConfig {
    /// Start building a configuration with custom settings.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    /// Cap on total entries processed per run, if any.
    pub fn max_refs(&self) -> Option<u32> {
        self.max_refs
    }

    /// Inclusive plausible publication-year range.
    pub fn plausible_year_range(&self) -> (u16, u16) {
        self.year_range
    }

    /// Confidence values assigned per grammar tag.
    pub fn confidence_policy(&self) -> &ConfidencePolicy {
        &self.confidence
    }

    pub(crate) fn is_compound_suffix(&self, token: &str) -> bool {
        let stripped = token
            .trim_end_matches(['.', ',', ';', ':'])
            .to_lowercase();
        self.compound_suffixes.iter().any(|s| *s == stripped)
    }
}

/// Builder for [`ParserConfig`]; collects string patterns and raw values and
/// validates everything in [`build`](ParserConfigBuilder::build).
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    max_refs: Option<u32>,
    chapter_marker_pattern: String,
    citation_key_pattern: String,
    year_range: (u16, u16),
    min_chapter_gap_lines: usize,
    anchor_lookback: usize,
    header_recurrence: usize,
    header_similarity: f64,
    compound_suffixes: Option<Vec<String>>,
    confidence: ConfidencePolicy,
    run_in_parallel: bool,
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self {
            max_refs: None,
            chapter_marker_pattern: DEFAULT_CHAPTER_MARKER_PATTERN.to_string(),
            citation_key_pattern: DEFAULT_CITATION_KEY_PATTERN.to_string(),
            year_range: DEFAULT_YEAR_RANGE,
            min_chapter_gap_lines: 1,
            anchor_lookback: 3,
            header_recurrence: 2,
            header_similarity: 0.92,
            compound_suffixes: None,
            confidence: ConfidencePolicy::default(),
            run_in_parallel: false,
        }
    }
}

impl ParserConfigBuilder {
    /// Cap the total number of entries processed across the whole run.
    pub fn max_refs(mut self, cap: u32) -> Self {
        self.max_refs = Some(cap);
        self
    }

    /// Override the chapter-marker pattern. Capture group 1 must capture the
    /// chapter number.
    pub fn chapter_marker_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.chapter_marker_pattern = pattern.into();
        self
    }

    /// Override the citation-key anchor pattern. Capture group 1, when
    /// present, is stored as the entry's citation key.
    pub fn citation_key_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.citation_key_pattern = pattern.into();
        self
    }

    /// Inclusive publication-year range accepted by the grammar matchers.
    pub fn plausible_year_range(mut self, start: u16, end: u16) -> Self {
        self.year_range = (start, end);
        self
    }

    /// Minimum content lines between chapter markers (default 1); fewer and
    /// the earlier marker is suppressed as a false positive.
    pub fn min_chapter_gap_lines(mut self, lines: usize) -> Self {
        self.min_chapter_gap_lines = lines;
        self
    }

    /// Lookback window (bytes) for accepting a citation-key anchor that is
    /// not at a line start (default 3).
    pub fn anchor_lookback(mut self, bytes: usize) -> Self {
        self.anchor_lookback = bytes;
        self
    }

    /// Number of distinct pages a line must recur on before it is removed as
    /// a running header/footer (default 2).
    pub fn header_recurrence(mut self, pages: usize) -> Self {
        self.header_recurrence = pages.max(2);
        self
    }

    /// Similarity threshold for near-duplicate header detection (default
    /// 0.92), clamped to `[0.5, 1.0]`.
    pub fn header_similarity(mut self, threshold: f64) -> Self {
        self.header_similarity = threshold.clamp(0.5, 1.0);
        self
    }

    /// Replace the built-in compound-suffix list used when joining
    /// hyphen-broken lines.
    pub fn compound_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.compound_suffixes = Some(suffixes);
        self
    }

    /// Replace the default per-grammar confidence values.
    pub fn confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence = policy;
        self
    }

    /// Process chapters on a rayon thread pool (requires the `parallel`
    /// feature; ignored otherwise). Output order is unaffected.
    pub fn run_in_parallel(mut self, enabled: bool) -> Self {
        self.run_in_parallel = enabled;
        self
    }

    /// Validate and compile the configuration.
    pub fn build(self) -> Result<ParserConfig, ConfigError> {
        let chapter_marker =
            Regex::new(&self.chapter_marker_pattern).map_err(|e| ConfigError::Pattern {
                name: "chapter_marker",
                message: e.to_string(),
            })?;
        let citation_key =
            Regex::new(&self.citation_key_pattern).map_err(|e| ConfigError::Pattern {
                name: "citation_key",
                message: e.to_string(),
            })?;
        let (start, end) = self.year_range;
        if start > end {
            return Err(ConfigError::EmptyYearRange { start, end });
        }
        self.confidence.validate()?;

        let compound_suffixes = self.compound_suffixes.unwrap_or_else(|| {
            DEFAULT_COMPOUND_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect()
        });

        Ok(ParserConfig {
            max_refs: self.max_refs,
            chapter_marker,
            citation_key,
            year_range: self.year_range,
            min_chapter_gap_lines: self.min_chapter_gap_lines,
            anchor_lookback: self.anchor_lookback,
            header_recurrence: self.header_recurrence,
            header_similarity: self.header_similarity,
            compound_suffixes,
            confidence: self.confidence,
            run_in_parallel: self.run_in_parallel,
        })
    }
}
