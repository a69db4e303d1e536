//! Error types for the statute pipeline.
//!
//! Only caller-supplied invalid input is fatal: a bad citation, a bad
//! profile, or an I/O problem. Parse-time ambiguity is always resolved
//! locally with a deterministic rule and never surfaces here.

use thiserror::Error;

/// Main error type for the statute-atlas library.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Citation failed shape validation (empty jurisdiction or section).
    #[error("Invalid citation: {0}")]
    InvalidCitation(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2025-01-01)")]
    InvalidDate(String),

    /// Jurisdiction profile failed validation.
    #[error("Invalid jurisdiction profile: {0}")]
    InvalidProfile(String),

    /// Subsection tree is deeper than the profile allows.
    ///
    /// Defensive invariant check in `Section::assemble` - indicates a
    /// misconfigured profile, not a data-quality issue.
    #[error("Subsection tree depth {depth} exceeds profile maximum {max}")]
    ProfileDepthExceeded { depth: usize, max: usize },

    /// A subsection identifier was empty at construction time.
    #[error("Empty subsection identifier at path '{path}'")]
    EmptyIdentifier { path: String },

    /// YAML profile deserialization failed.
    #[error("Profile deserialization failed: {0}")]
    ProfileParse(#[from] serde_yaml_ng::Error),

    /// IO error (profile files, CLI input/output, XML writer).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized XML was not valid UTF-8. Cannot happen with the
    /// writer configuration used here, but propagated rather than unwrapped.
    #[error("XML output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for statute-atlas operations.
pub type Result<T> = std::result::Result<T, AtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_citation_display() {
        let err = AtlasError::InvalidCitation("empty section designator".to_string());
        assert!(err.to_string().contains("empty section designator"));
    }

    #[test]
    fn test_depth_exceeded_display() {
        let err = AtlasError::ProfileDepthExceeded { depth: 5, max: 4 };
        assert_eq!(
            err.to_string(),
            "Subsection tree depth 5 exceeds profile maximum 4"
        );
    }

    #[test]
    fn test_empty_identifier_display() {
        let err = AtlasError::EmptyIdentifier {
            path: "a/1".to_string(),
        };
        assert!(err.to_string().contains("a/1"));
    }
}
