//! Marker grammar: the four enumeration-marker families used in legal
//! drafting and their textual envelopes.
//!
//! Matching here is purely lexical. Families that share glyphs (a
//! single-character lower-letter marker like "i" or "v" is also a valid
//! lower-roman numeral) are never disambiguated by the grammar itself;
//! the segmenter asks for the family its jurisdiction profile expects at
//! the current depth.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// One of the four enumeration-glyph shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerFamily {
    /// Decimal digits: (1), (2), ... or "1.", "2.".
    Decimal,

    /// Lowercase letters: (a), (b), ... including double letters (aa).
    LowerLetter,

    /// Uppercase letters: (A), (B), ... including double letters (AA).
    UpperLetter,

    /// Lowercase roman numerals: (i), (ii), (iv), ...
    LowerRoman,
}

impl MarkerFamily {
    /// All families, in the order used for regex table indexing.
    pub const ALL: [MarkerFamily; 4] = [
        MarkerFamily::Decimal,
        MarkerFamily::LowerLetter,
        MarkerFamily::UpperLetter,
        MarkerFamily::LowerRoman,
    ];

    /// Stable string form, matching the profile configuration surface.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::LowerLetter => "lower-letter",
            Self::UpperLetter => "upper-letter",
            Self::LowerRoman => "lower-roman",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Decimal => 0,
            Self::LowerLetter => 1,
            Self::UpperLetter => 2,
            Self::LowerRoman => 3,
        }
    }

    /// Regex fragment matching one bare identifier of this family.
    ///
    /// The lower-roman fragment over-matches ("vv" is not a numeral);
    /// candidates are post-validated with [`is_valid_roman`].
    fn atom(self) -> &'static str {
        match self {
            Self::Decimal => r"\d{1,3}",
            Self::LowerLetter => r"[a-z]{1,2}",
            Self::UpperLetter => r"[A-Z]{1,2}",
            Self::LowerRoman => r"[ivxlc]{1,6}",
        }
    }

    /// Find all confident marker occurrences of this family in `text`,
    /// in document order.
    ///
    /// A parenthesized marker counts only when it is followed by
    /// whitespace and sits at the span start or right after whitespace;
    /// a bare "(1)" inside a sentence (a cross-reference) never splits.
    /// A dotted marker ("a.", "A.--") counts only at a line start.
    #[must_use]
    pub fn occurrences(&self, text: &str) -> Vec<MarkerHit> {
        let mut hits: Vec<MarkerHit> = Vec::new();

        for m in PAREN_PATTERNS[self.index()].captures_iter(text) {
            let (Some(whole), Some(ident)) = (m.get(0), m.get(1)) else {
                continue;
            };
            if *self == Self::LowerRoman && !is_valid_roman(ident.as_str()) {
                continue;
            }
            if !boundary_before(text, whole.start()) {
                continue;
            }
            // A marker introduces text, so whitespace must follow;
            // "(a)(1)" chains are citations and are rejected here.
            match text[whole.end()..].chars().next() {
                Some(c) if c.is_whitespace() => {}
                _ => continue,
            }
            hits.push(MarkerHit {
                identifier: ident.as_str().to_string(),
                start: whole.start(),
                body_start: whole.end(),
            });
        }

        for m in DOTTED_PATTERNS[self.index()].captures_iter(text) {
            let (Some(whole), Some(ident)) = (m.get(0), m.get(1)) else {
                continue;
            };
            if *self == Self::LowerRoman && !is_valid_roman(ident.as_str()) {
                continue;
            }
            hits.push(MarkerHit {
                identifier: ident.as_str().to_string(),
                start: whole.start(),
                body_start: whole.end(),
            });
        }

        hits.sort_by_key(|h| h.start);
        hits.dedup_by_key(|h| h.start);
        hits
    }

    /// Character offset of the first confident occurrence, if any.
    ///
    /// Used by the ambiguity resolver's first-occurrence policy.
    #[must_use]
    pub fn first_occurrence(&self, text: &str) -> Option<usize> {
        self.occurrences(text).first().map(|h| h.start)
    }
}

impl std::fmt::Display for MarkerFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized marker occurrence within a text span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    /// Bare identifier with the envelope stripped (e.g., "a", "1", "iv").
    pub identifier: String,

    /// Byte offset where the marker (including envelope) begins.
    pub start: usize,

    /// Byte offset where the run's body begins (just past the envelope).
    pub body_start: usize,
}

/// Parenthesized envelope: "(a)", "(12)", "(iv)".
#[allow(clippy::expect_used)] // Static regexes that are guaranteed to be valid
static PAREN_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    MarkerFamily::ALL.map(|f| {
        Regex::new(&format!(r"\(({})\)", f.atom())).expect("valid regex")
    })
});

/// Dotted envelope at a line start: "a. ", "1. ", "A.--".
#[allow(clippy::expect_used)] // Static regexes that are guaranteed to be valid
static DOTTED_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    MarkerFamily::ALL.map(|f| {
        Regex::new(&format!(
            r"(?m)^[ \t]*({})\.(?:--+|—|[ \t]+)",
            f.atom()
        ))
        .expect("valid regex")
    })
});

/// True if the offset is the span start or preceded by whitespace.
fn boundary_before(text: &str, offset: usize) -> bool {
    if offset == 0 {
        return true;
    }
    text[..offset]
        .chars()
        .next_back()
        .is_some_and(char::is_whitespace)
}

/// Validate a lowercase roman numeral (strict subtractive form, i-ccc).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ROMAN_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^c{0,3}(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})$").expect("valid regex")
});

/// Check whether a token is a well-formed lowercase roman numeral.
#[must_use]
pub fn is_valid_roman(token: &str) -> bool {
    !token.is_empty() && ROMAN_SHAPE.is_match(token)
}
