//! Jurisdiction profiles: declarative per-source parsing configuration.
//!
//! A profile states which marker family appears at each nesting depth,
//! how headings are written, and how much direct text a node may carry.
//! Profiles are built (or loaded from YAML) once per source, validated,
//! and shared read-only across every parse for that source - parse code
//! never branches on source identity.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{DEFAULT_HEADING_PATTERN, DEFAULT_TEXT_CAP, MAX_TREE_DEPTH};
use crate::error::{AtlasError, Result};
use crate::markers::MarkerFamily;

/// How the depth-0 marker family is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopLevelRule {
    /// The depth sequence is used exactly as configured.
    #[default]
    Fixed,

    /// The first two families of the depth sequence are candidates; the
    /// one whose marker occurs first in the document is promoted to
    /// depth 0 (the Alabama-style per-document convention).
    FirstOccurrence,
}

/// Per-source parsing configuration. Read-only after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionProfile {
    /// Marker family expected at each depth, outermost first.
    depth_sequence: Vec<MarkerFamily>,

    /// Top-level family selection policy.
    #[serde(default)]
    top_level: TopLevelRule,

    /// Heading-extraction pattern; `None` disables heading extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading_pattern: Option<String>,

    /// Maximum nesting depth the tree may reach.
    #[serde(default = "default_max_depth")]
    max_depth: usize,

    /// Direct-text cap per depth, in characters. Shorter lists repeat
    /// their last entry for deeper levels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    text_caps_by_depth: Vec<usize>,

    /// Compiled form of `heading_pattern`, built during validation.
    #[serde(skip)]
    compiled_heading: Option<Regex>,
}

fn default_max_depth() -> usize {
    MAX_TREE_DEPTH
}

impl JurisdictionProfile {
    /// Start building a profile.
    #[must_use]
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    /// Fixed letter -> decimal -> roman -> upper-letter sequence with the
    /// standard ".--" heading trailer. Matches the most common state
    /// drafting convention ("(a) ... (1) ... (i) ... (A) ...").
    #[must_use]
    #[allow(clippy::expect_used)] // Preset configuration is statically valid
    pub fn letter_decimal_roman() -> Self {
        Self::builder()
            .depth_sequence(vec![
                MarkerFamily::LowerLetter,
                MarkerFamily::Decimal,
                MarkerFamily::LowerRoman,
                MarkerFamily::UpperLetter,
            ])
            .heading_pattern(DEFAULT_HEADING_PATTERN)
            .text_caps_by_depth(vec![2_000, 2_000, 2_000, 2_000])
            .build()
            .expect("preset profile is valid")
    }

    /// Letter/decimal sequence whose top level is decided per document
    /// by first occurrence ("(a)" vs. "(1)", whichever appears earlier).
    #[must_use]
    #[allow(clippy::expect_used)] // Preset configuration is statically valid
    pub fn dynamic_first_marker() -> Self {
        Self::builder()
            .depth_sequence(vec![
                MarkerFamily::LowerLetter,
                MarkerFamily::Decimal,
                MarkerFamily::LowerRoman,
            ])
            .top_level(TopLevelRule::FirstOccurrence)
            .heading_pattern(DEFAULT_HEADING_PATTERN)
            .text_caps_by_depth(vec![2_000, 2_000, 2_000])
            .max_depth(3)
            .build()
            .expect("preset profile is valid")
    }

    /// Load and validate a profile from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let profile: Self = serde_yaml_ng::from_str(yaml)?;
        profile.finalize()
    }

    /// Load and validate a profile from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Validate the configuration and compile the heading pattern.
    fn finalize(mut self) -> Result<Self> {
        if self.depth_sequence.is_empty() {
            return Err(AtlasError::InvalidProfile(
                "depth_sequence must list at least one marker family".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(AtlasError::InvalidProfile(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if let Some(cap) = self.text_caps_by_depth.iter().find(|&&c| c == 0) {
            return Err(AtlasError::InvalidProfile(format!(
                "text cap must be positive, got {cap}"
            )));
        }

        self.compiled_heading = match self.heading_pattern.as_deref() {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
                AtlasError::InvalidProfile(format!("bad heading pattern: {e}"))
            })?),
            None => None,
        };

        Ok(self)
    }

    /// Marker family expected at the given depth, if the sequence
    /// extends that far.
    #[must_use]
    pub fn family_for_depth(&self, depth: usize) -> Option<MarkerFamily> {
        if depth >= self.max_depth {
            return None;
        }
        self.depth_sequence.get(depth).copied()
    }

    /// The configured depth sequence, outermost first.
    #[must_use]
    pub fn depth_sequence(&self) -> &[MarkerFamily] {
        &self.depth_sequence
    }

    /// Top-level selection policy.
    #[must_use]
    pub fn top_level(&self) -> TopLevelRule {
        self.top_level
    }

    /// Maximum nesting depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Direct-text cap for the given depth, in characters.
    ///
    /// Falls back to the last configured cap, then to the crate default.
    #[must_use]
    pub fn cap_for_depth(&self, depth: usize) -> usize {
        self.text_caps_by_depth
            .get(depth)
            .or_else(|| self.text_caps_by_depth.last())
            .copied()
            .unwrap_or(DEFAULT_TEXT_CAP)
    }

    /// Compiled heading pattern, if heading extraction is enabled.
    #[must_use]
    pub fn heading_regex(&self) -> Option<&Regex> {
        self.compiled_heading.as_ref()
    }

    /// Return a copy whose depth sequence is reordered, preserving all
    /// other settings. Used by the ambiguity resolver; the original
    /// profile is never mutated.
    #[must_use]
    pub(crate) fn with_depth_sequence(&self, depth_sequence: Vec<MarkerFamily>) -> Self {
        Self {
            depth_sequence,
            ..self.clone()
        }
    }
}

/// Builder for [`JurisdictionProfile`].
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    depth_sequence: Vec<MarkerFamily>,
    top_level: TopLevelRule,
    heading_pattern: Option<String>,
    max_depth: Option<usize>,
    text_caps_by_depth: Vec<usize>,
}

impl ProfileBuilder {
    /// Set the marker family per depth, outermost first.
    #[must_use]
    pub fn depth_sequence(mut self, families: Vec<MarkerFamily>) -> Self {
        self.depth_sequence = families;
        self
    }

    /// Set the top-level selection policy.
    #[must_use]
    pub fn top_level(mut self, rule: TopLevelRule) -> Self {
        self.top_level = rule;
        self
    }

    /// Enable heading extraction with the given pattern.
    #[must_use]
    pub fn heading_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.heading_pattern = Some(pattern.into());
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the per-depth direct-text caps.
    #[must_use]
    pub fn text_caps_by_depth(mut self, caps: Vec<usize>) -> Self {
        self.text_caps_by_depth = caps;
        self
    }

    /// Validate and build the profile.
    pub fn build(self) -> Result<JurisdictionProfile> {
        JurisdictionProfile {
            depth_sequence: self.depth_sequence,
            top_level: self.top_level,
            heading_pattern: self.heading_pattern,
            max_depth: self.max_depth.unwrap_or(MAX_TREE_DEPTH),
            text_caps_by_depth: self.text_caps_by_depth,
            compiled_heading: None,
        }
        .finalize()
    }
}
