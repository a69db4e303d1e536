//! Hierarchical segmentation of section text into a subsection tree.
//!
//! One recursive operation: split a span into runs at the marker family
//! the profile expects at the current depth, carve each run's children
//! out with the next family, and keep only the remainder as the run's
//! direct text. No synthetic nodes are ever fabricated; a span with no
//! recognizable markers stays with its parent as direct text.

use regex::Regex;
use tracing::warn;

use crate::profile::JurisdictionProfile;
use crate::types::Subsection;

/// Segment a text span into subsections, starting at the given depth.
///
/// Returns the nodes in document order. An empty result means the whole
/// span is the caller's direct text (flat section at depth 0).
#[must_use]
pub fn segment(text: &str, depth: usize, profile: &JurisdictionProfile) -> Vec<Subsection> {
    let Some(family) = profile.family_for_depth(depth) else {
        return Vec::new();
    };

    let hits = family.occurrences(text);
    let mut nodes: Vec<Subsection> = Vec::with_capacity(hits.len());

    for (i, hit) in hits.iter().enumerate() {
        let run_end = hits.get(i + 1).map_or(text.len(), |next| next.start);
        let body = text[hit.body_start..run_end].trim();

        let (heading, body) = split_heading(body, profile.heading_regex());

        // Children are carved out first; direct text is only what
        // precedes the first child marker.
        let direct_end = profile
            .family_for_depth(depth + 1)
            .and_then(|next_family| next_family.first_occurrence(body))
            .unwrap_or(body.len());
        let direct = truncate_chars(body[..direct_end].trim(), profile.cap_for_depth(depth));

        let children = segment(body, depth + 1, profile);

        let mut node = Subsection::new(hit.identifier.clone(), direct);
        if let Some(h) = heading {
            node = node.with_heading(h);
        }
        nodes.push(node.with_children(children));
    }

    nodes
}

/// Split a ".--"-trailed heading off the front of a run body.
fn split_heading<'a>(body: &'a str, pattern: Option<&Regex>) -> (Option<String>, &'a str) {
    let Some(pattern) = pattern else {
        return (None, body);
    };
    let Some(caps) = pattern.captures(body) else {
        return (None, body);
    };
    let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
        return (None, body);
    };
    (
        Some(label.as_str().trim().to_string()),
        &body[whole.end()..],
    )
}

/// Truncate to exactly `cap` characters; text at or under the cap is
/// returned unmodified.
fn truncate_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            warn!(
                cap,
                dropped = text.chars().count() - cap,
                "direct text exceeded depth cap, truncating"
            );
            text[..byte_idx].to_string()
        }
        None => text.to_string(),
    }
}
