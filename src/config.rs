//! Configuration constants and validation functions.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AtlasError, Result};

/// Akoma Ntoso 3.0 namespace URI.
pub const AKN_NAMESPACE: &str = "http://docs.oasis-open.org/legaldocml/ns/akn/3.0";

/// Namespace prefix registered on the document root.
pub const AKN_PREFIX: &str = "akn";

/// Serializer-side cap on paragraph text nodes, in characters.
///
/// Applied independently of the segmenter's per-depth caps so that a
/// misconfigured profile can never produce an unbounded text node.
pub const SERIALIZER_TEXT_CAP: usize = 2_000;

/// Default per-depth text cap used when a profile omits one.
pub const DEFAULT_TEXT_CAP: usize = 5_000;

/// Cap on extracted history/amendment notes, in characters.
pub const HISTORY_NOTE_CAP: usize = 1_000;

/// Hard ceiling on subsection nesting. Legal drafting conventions do not
/// nest enumerations deeper than this in any supported source.
pub const MAX_TREE_DEPTH: usize = 4;

/// Default heading pattern: text up to the first ".--" or ".—" trailer,
/// as in "(a) General rule.--A tax is imposed."
pub const DEFAULT_HEADING_PATTERN: &str = r"^([A-Za-z][^.\n]{0,118})\.\s*(?:--+|—)\s*";

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate date format (YYYY-MM-DD).
///
/// # Examples
/// ```
/// use statute_atlas::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("invalid").is_err());
/// assert!(validate_date("2025-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(AtlasError::InvalidDate(date_str.to_string()));
    }

    // Parse to reject impossible dates like 2025-02-30
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AtlasError::InvalidDate(date_str.to_string()))?;

    Ok(())
}

/// Sanitize a string for use inside an AKN `eId`.
///
/// Every character outside `[A-Za-z0-9_]` is replaced with an underscore.
/// This is the recovery rule for the SerializationIncomplete case: the
/// substitution is local and never fatal.
///
/// # Examples
/// ```
/// use statute_atlas::config::sanitize_eid;
///
/// assert_eq!(sanitize_eid("26-51-101"), "26_51_101");
/// assert_eq!(sanitize_eid("58.1-320"), "58_1_320");
/// assert_eq!(sanitize_eid("a"), "a");
/// ```
pub fn sanitize_eid(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
