//! Statute Atlas - Parse US statute text into Akoma Ntoso XML.
//!
//! This crate takes statute section text (already extracted to plain
//! text) and converts it to a canonical section model and Akoma Ntoso
//! 3.0 XML, driven by per-jurisdiction parsing profiles.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use statute_atlas::{convert_section, section_to_akn, JurisdictionProfile};
//! use statute_atlas::types::{Citation, SectionInput};
//!
//! let input = SectionInput {
//!     raw_text: "(a) General rule.--A tax is imposed. (b) Exception.--None applies.".to_string(),
//!     citation: Citation::new("pa", "72-3116").unwrap(),
//!     title_name: "Tax Reform Code".to_string(),
//!     heading: Some("Imposition of tax".to_string()),
//!     source_url: "https://example.com/72-3116".to_string(),
//!     retrieved_at: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
//!     effective_date: None,
//! };
//!
//! let profile = JurisdictionProfile::letter_decimal_roman();
//! let section = convert_section(&input, &profile).unwrap();
//! assert_eq!(section.subsections.len(), 2);
//!
//! let xml = section_to_akn(&section, input.retrieved_at).unwrap();
//! assert!(xml.contains("sec_72_3116__subsec_a"));
//! ```
//!
//! # Architecture
//!
//! The pipeline is a pure, synchronous transformation with no shared
//! mutable state; every operation is safe to run concurrently across
//! independent sections.
//!
//! - [`config`]: Configuration constants and validation
//! - [`error`]: Error types and Result alias
//! - [`types`]: Core data types (Citation, Section, Subsection)
//! - [`markers`]: Enumeration-marker grammar
//! - [`profile`]: Per-jurisdiction parsing profiles
//! - [`resolver`]: Top-level marker ambiguity resolution
//! - [`segmenter`]: Recursive subsection segmentation
//! - [`text`]: Input normalization and history-note extraction
//! - [`akn`]: Akoma Ntoso 3.0 serialization
//! - [`convert`]: Pipeline orchestration
//! - [`cli`]: Command-line interface

pub mod akn;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod markers;
pub mod profile;
pub mod resolver;
pub mod segmenter;
pub mod text;
pub mod types;

// Re-export main functions
pub use akn::section_to_akn;
pub use convert::convert_section;

// Re-export commonly used items
pub use config::validate_date;
pub use error::{AtlasError, Result};
pub use markers::MarkerFamily;
pub use profile::{JurisdictionProfile, TopLevelRule};
pub use types::{Citation, Section, SectionInput, Subsection};
