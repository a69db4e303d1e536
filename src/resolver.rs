//! Top-level marker ambiguity resolution.
//!
//! Some sources pick "(a)" or "(1)" as the outermost enumeration on a
//! per-document basis. For profiles configured with the first-occurrence
//! rule, the family whose marker appears earliest in the raw text is
//! promoted to depth 0 and the runner-up becomes depth 1. The decision
//! is purely positional and deterministic; nothing is counted or scored.

use tracing::debug;

use crate::profile::{JurisdictionProfile, TopLevelRule};

/// Resolve the effective depth ordering for one document.
///
/// Returns a profile to segment with. For fixed profiles this is a plain
/// clone; for first-occurrence profiles the first two families of the
/// depth sequence may be swapped. When neither candidate family occurs
/// in the text the profile is returned unchanged and the segmenter will
/// produce a flat section.
#[must_use]
pub fn resolve(profile: &JurisdictionProfile, text: &str) -> JurisdictionProfile {
    if profile.top_level() != TopLevelRule::FirstOccurrence {
        return profile.clone();
    }

    let seq = profile.depth_sequence();
    let (Some(&first), Some(&second)) = (seq.first(), seq.get(1)) else {
        return profile.clone();
    };

    let first_at = first.first_occurrence(text);
    let second_at = second.first_occurrence(text);

    let promote_second = match (first_at, second_at) {
        (Some(a), Some(b)) => b < a,
        (None, Some(_)) => true,
        _ => false,
    };

    if promote_second {
        debug!(
            top = %second,
            runner_up = %first,
            "first-occurrence rule promoted second family to top level"
        );
        let mut reordered = seq.to_vec();
        reordered.swap(0, 1);
        profile.with_depth_sequence(reordered)
    } else {
        debug!(top = %first, "first-occurrence rule kept configured order");
        profile.clone()
    }
}
