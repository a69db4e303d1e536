//! Input text cleanup and history-note extraction.
//!
//! Raw section text arrives pre-extracted from HTML or PDF sources and
//! carries the usual extraction artifacts: Windows line endings, mixed
//! Unicode composition, and missing spaces after commas. Normalization
//! runs once per section before any marker scanning.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::config::HISTORY_NOTE_CAP;

/// Regex pattern for missing space after comma before a word character.
/// Matches "word,word" but not "word, word" or "1,000".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MISSING_SPACE_AFTER_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z]),([a-zA-Z])").expect("valid regex"));

/// Runs of three or more newlines (with optional trailing spaces).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid regex"));

/// Lead-in of a trailing legislative-history note at a line start:
/// "History.--...", "Amended by ...", "1997 Amendment. ...".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HISTORY_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:History|(?:\d{4}[ \t]+)?Amendment|Amended by)\s*[.:]?\s*(?:--+|—)?[ \t]*")
        .expect("valid regex")
});

/// Normalize extracted source text before parsing.
///
/// Applies NFC composition, converts line endings to `\n`, repairs
/// missing spaces after commas, collapses runs of blank lines, and
/// trims outer whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let unixed = composed.replace("\r\n", "\n").replace('\r', "\n");

    // Loop until no more replacements needed (handles overlapping cases like "a,b,c")
    let mut result = unixed;
    loop {
        let replaced = MISSING_SPACE_AFTER_COMMA
            .replace_all(&result, "$1, $2")
            .to_string();
        if replaced == result {
            break;
        }
        result = replaced;
    }

    EXCESS_BLANK_LINES
        .replace_all(&result, "\n\n")
        .trim()
        .to_string()
}

/// Split a trailing history/amendment note off the section text.
///
/// Returns the text with the note removed plus the note itself, capped
/// at [`HISTORY_NOTE_CAP`] characters. The note runs from its lead-in to
/// the next blank line (or a "Cross References" annotation block). Text
/// without a recognizable note comes back unchanged.
#[must_use]
pub fn extract_history_note(text: &str) -> (String, Option<String>) {
    let Some(lead) = HISTORY_LEAD.find(text) else {
        return (text.to_string(), None);
    };

    let tail = &text[lead.end()..];
    let note_end = ["\n\n", "Cross References"]
        .iter()
        .filter_map(|term| tail.find(term))
        .min()
        .unwrap_or(tail.len());

    let note: String = tail[..note_end].trim().chars().take(HISTORY_NOTE_CAP).collect();
    let remaining = text[..lead.start()].trim_end().to_string();

    if note.is_empty() {
        (remaining, None)
    } else {
        (remaining, Some(note))
    }
}
