//! Core data types for the canonical statute document model.
//!
//! `Citation` and `JurisdictionProfile` are long-lived and read-only;
//! `Section` and its `Subsection` tree are produced fresh by one parse
//! call and owned by the caller. Nothing here is mutated after
//! construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::sanitize_eid;
use crate::error::{AtlasError, Result};
use crate::profile::JurisdictionProfile;

/// Immutable identity of a legal provision.
///
/// The jurisdiction code is a short source identifier (a two-letter state
/// code like "pa", or a federal title number like "26"); the section
/// designator is free-form and jurisdiction-specific ("26-51-101",
/// "58.1-320", "71.01").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Jurisdiction code (e.g., "pa", "al", "26").
    pub jurisdiction: String,

    /// Section designator (e.g., "26-51-101").
    pub section: String,
}

impl Citation {
    /// Create a citation, validating its shape.
    ///
    /// # Errors
    /// Returns [`AtlasError::InvalidCitation`] if either part is empty;
    /// this is a caller bug and is raised immediately.
    pub fn new(jurisdiction: impl Into<String>, section: impl Into<String>) -> Result<Self> {
        let jurisdiction = jurisdiction.into();
        let section = section.into();

        if jurisdiction.trim().is_empty() {
            return Err(AtlasError::InvalidCitation(
                "empty jurisdiction code".to_string(),
            ));
        }
        if section.trim().is_empty() {
            return Err(AtlasError::InvalidCitation(
                "empty section designator".to_string(),
            ));
        }

        Ok(Self {
            jurisdiction,
            section,
        })
    }

    /// Root `eId` for the section element, derived from the designator.
    ///
    /// # Examples
    /// ```
    /// use statute_atlas::types::Citation;
    ///
    /// let cite = Citation::new("pa", "26-51-101").unwrap();
    /// assert_eq!(cite.to_eid(), "sec_26_51_101");
    /// ```
    #[must_use]
    pub fn to_eid(&self) -> String {
        format!("sec_{}", sanitize_eid(&self.section))
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} § {}",
            self.jurisdiction.to_uppercase(),
            self.section
        )
    }
}

/// One node in the enumeration tree of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    /// Bare marker token with the envelope stripped (e.g., "a", "1", "iv").
    pub identifier: String,

    /// Short label preceding a dash trailer (e.g., "General rule").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Text belonging directly to this node, excluding all descendants.
    pub text: String,

    /// Child subsections in document order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Subsection>,
}

impl Subsection {
    /// Create a leaf subsection.
    #[must_use]
    pub fn new(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            heading: None,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Attach a heading.
    #[must_use]
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Attach children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Subsection>) -> Self {
        self.children = children;
        self
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Subsection::depth)
            .max()
            .unwrap_or(0)
    }

    /// Recursively aggregate marker, heading, direct text, and all
    /// descendants' text in document order.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        match &self.heading {
            Some(h) => parts.push(format!("({}) {}.--", self.identifier, h)),
            None => parts.push(format!("({})", self.identifier)),
        }
        if !self.text.is_empty() {
            parts.push(self.text.clone());
        }
        for child in &self.children {
            parts.push(child.full_text());
        }
        parts.join("\n")
    }
}

/// Input record handed to the pipeline by the (excluded) fetch layer.
///
/// The raw text must already be extracted to plain text with paragraph
/// breaks preserved; the core makes no network calls.
#[derive(Debug, Clone)]
pub struct SectionInput {
    /// Raw section text, pre-extraction from HTML/XML/PDF.
    pub raw_text: String,

    /// Citation identifying the provision.
    pub citation: Citation,

    /// Display name of the containing title/chapter
    /// (e.g., "Pennsylvania Consolidated Statutes - Taxation and Fiscal Affairs").
    pub title_name: String,

    /// Pre-known section heading, if the source exposes one.
    pub heading: Option<String>,

    /// URL the text was retrieved from.
    pub source_url: String,

    /// Date the text was retrieved.
    pub retrieved_at: NaiveDate,

    /// Effective date, if known.
    pub effective_date: Option<NaiveDate>,
}

/// A complete statute section with its subsection tree.
///
/// Created once per parse; re-parsing the same citation produces a new
/// value, never an in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Citation identifying this section.
    pub citation: Citation,

    /// Display name of the containing title/chapter.
    pub title_name: String,

    /// Section heading (e.g., "Imposition of tax").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Full raw text, pre-segmentation.
    pub text: String,

    /// Top-level subsections in document order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub subsections: Vec<Subsection>,

    /// Amendment/history note, if present in the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,

    /// Effective date, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,

    /// URL to the official source.
    pub source_url: String,

    /// Date this version was retrieved.
    pub retrieved_at: NaiveDate,
}

impl Section {
    /// Assemble a section from its parts, enforcing the model invariants.
    ///
    /// # Errors
    /// * [`AtlasError::EmptyIdentifier`] if any subsection identifier is
    ///   empty.
    /// * [`AtlasError::ProfileDepthExceeded`] if the tree is deeper than
    ///   the profile allows. This should never trigger when the segmenter
    ///   produced the tree; it guards against a misconfigured profile.
    pub fn assemble(
        input: &SectionInput,
        text: String,
        subsections: Vec<Subsection>,
        profile: &JurisdictionProfile,
    ) -> Result<Self> {
        validate_tree(&subsections, "", profile.max_depth())?;

        Ok(Self {
            citation: input.citation.clone(),
            title_name: input.title_name.clone(),
            heading: input.heading.clone(),
            text,
            subsections,
            history: None,
            effective_date: input.effective_date,
            source_url: input.source_url.clone(),
            retrieved_at: input.retrieved_at,
        })
    }

    /// Attach a history note.
    #[must_use]
    pub fn with_history(mut self, history: Option<String>) -> Self {
        self.history = history;
        self
    }

    /// Walk the subsection tree by slash-separated path (e.g., "a", "b/1").
    #[must_use]
    pub fn get_subsection(&self, path: &str) -> Option<&Subsection> {
        if path.is_empty() {
            return None;
        }
        let mut children = &self.subsections;
        let mut node = None;
        for seg in path.split('/') {
            node = children.iter().find(|c| c.identifier == seg);
            match node {
                Some(n) => children = &n.children,
                None => return None,
            }
        }
        node
    }

    /// Get the full recursive text for a subsection by path.
    #[must_use]
    pub fn get_subsection_text(&self, path: &str) -> Option<String> {
        self.get_subsection(path).map(Subsection::full_text)
    }
}

/// Check identifiers and depth over the whole tree.
fn validate_tree(nodes: &[Subsection], parent_path: &str, max_depth: usize) -> Result<()> {
    validate_level(nodes, parent_path, 0, max_depth)
}

fn validate_level(
    nodes: &[Subsection],
    parent_path: &str,
    depth: usize,
    max_depth: usize,
) -> Result<()> {
    if !nodes.is_empty() && depth >= max_depth {
        return Err(AtlasError::ProfileDepthExceeded {
            depth: depth + 1,
            max: max_depth,
        });
    }

    for node in nodes {
        let path = if parent_path.is_empty() {
            node.identifier.clone()
        } else {
            format!("{parent_path}/{}", node.identifier)
        };

        if node.identifier.trim().is_empty() {
            return Err(AtlasError::EmptyIdentifier {
                path: parent_path.to_string(),
            });
        }

        validate_level(&node.children, &path, depth + 1, max_depth)?;
    }

    Ok(())
}
