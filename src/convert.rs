//! Pipeline orchestration: raw text in, canonical section out.

use tracing::debug;

use crate::error::Result;
use crate::profile::JurisdictionProfile;
use crate::resolver::resolve;
use crate::segmenter::segment;
use crate::text::{extract_history_note, normalize_text};
use crate::types::{Section, SectionInput};

/// Run the full parse pipeline on one section input.
///
/// Normalizes the raw text, splits off any trailing history note,
/// resolves the top-level marker family, segments the body into a
/// subsection tree, and assembles the validated [`Section`].
///
/// # Errors
/// Propagates the model validation errors from [`Section::assemble`];
/// parse ambiguity and malformed markers never fail, they degrade to a
/// flatter tree.
pub fn convert_section(input: &SectionInput, profile: &JurisdictionProfile) -> Result<Section> {
    let normalized = normalize_text(&input.raw_text);
    let (body, history) = extract_history_note(&normalized);

    let resolved = resolve(profile, &body);
    let subsections = segment(&body, 0, &resolved);
    debug!(
        citation = %input.citation,
        top_level_nodes = subsections.len(),
        has_history = history.is_some(),
        "segmented section"
    );

    Ok(Section::assemble(input, body, subsections, &resolved)?.with_history(history))
}
