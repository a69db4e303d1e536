//! End-to-end integration tests for the statute conversion pipeline.
//!
//! Tests the complete pipeline from raw section text to Akoma Ntoso XML
//! using a Pennsylvania-style fixture section, plus the CLI binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::NaiveDate;
use predicates::prelude::*;
use statute_atlas::types::{Citation, SectionInput};
use statute_atlas::{convert_section, section_to_akn, JurisdictionProfile};

const AKN_NS: &str = "http://docs.oasis-open.org/legaldocml/ns/akn/3.0";

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn fixture_input() -> SectionInput {
    SectionInput {
        raw_text: load_fixture("pa_72_3116.txt"),
        citation: Citation::new("pa", "72-3116").unwrap(),
        title_name: "Tax Reform Code".to_string(),
        heading: Some("Imposition of tax".to_string()),
        source_url: "https://example.com/pa/72-3116".to_string(),
        retrieved_at: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        effective_date: None,
    }
}

fn shipped_profile(name: &str) -> JurisdictionProfile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("profiles")
        .join(name);
    JurisdictionProfile::from_yaml_file(&path).expect("profile loads")
}

#[test]
fn test_pipeline_section_tree() {
    let section = convert_section(&fixture_input(), &shipped_profile("pa.yaml")).unwrap();

    assert_eq!(section.subsections.len(), 2);

    let a = &section.subsections[0];
    assert_eq!(a.identifier, "a");
    assert_eq!(a.heading.as_deref(), Some("General rule"));
    assert_eq!(a.text, "A tax is imposed on the transfer of property.");
    assert_eq!(a.children.len(), 2);
    assert_eq!(a.children[0].identifier, "1");
    assert_eq!(a.children[0].text, "On residents.");
    assert_eq!(a.children[1].identifier, "2");
    assert_eq!(a.children[1].text, "On nonresidents.");

    let b = &section.subsections[1];
    assert_eq!(b.identifier, "b");
    assert_eq!(b.heading.as_deref(), Some("Exception"));
    assert_eq!(b.text, "None applies.");
    assert!(b.children.is_empty());

    assert_eq!(
        section.history.as_deref(),
        Some("Act of Mar. 4, 1971, P.L. 6, No. 2.")
    );
}

#[test]
fn test_pipeline_akn_structure() {
    let section = convert_section(&fixture_input(), &shipped_profile("pa.yaml")).unwrap();
    let xml = section_to_akn(&section, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()).unwrap();

    let doc = roxmltree::Document::parse(&xml).expect("output is well-formed");
    assert_eq!(doc.root_element().tag_name().namespace(), Some(AKN_NS));

    let subsec = doc
        .descendants()
        .find(|n| n.has_tag_name((AKN_NS, "subsection")))
        .expect("subsection element");
    assert_eq!(subsec.attribute("eId"), Some("sec_72_3116__subsec_a"));

    let heading = subsec
        .children()
        .find(|n| n.has_tag_name((AKN_NS, "heading")))
        .expect("heading element");
    assert_eq!(heading.text(), Some("General rule"));

    let para_eids: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name((AKN_NS, "paragraph")))
        .filter_map(|n| n.attribute("eId"))
        .collect();
    assert_eq!(
        para_eids,
        vec![
            "sec_72_3116__subsec_a__para_1",
            "sec_72_3116__subsec_a__para_2"
        ]
    );
}

#[test]
fn test_pipeline_output_is_idempotent() {
    let generation_date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let profile = shipped_profile("pa.yaml");

    let first_section = convert_section(&fixture_input(), &profile).unwrap();
    let second_section = convert_section(&fixture_input(), &profile).unwrap();
    assert_eq!(first_section, second_section);

    let first_xml = section_to_akn(&first_section, generation_date).unwrap();
    let second_xml = section_to_akn(&second_section, generation_date).unwrap();
    assert_eq!(first_xml, second_xml);
}

#[test]
fn test_alabama_profile_dynamic_top_level() {
    let mut input = fixture_input();
    input.raw_text = "(1) Levy of tax. (a) On individuals. (2) Exemptions.".to_string();
    input.citation = Citation::new("al", "40-18-5").unwrap();

    let section = convert_section(&input, &shipped_profile("al.yaml")).unwrap();
    assert_eq!(section.subsections.len(), 2);
    assert_eq!(section.subsections[0].identifier, "1");
    assert_eq!(section.subsections[0].children[0].identifier, "a");
}

#[test]
fn test_flat_section_renders_content_paragraphs() {
    let mut input = fixture_input();
    input.raw_text = "A continuing levy applies.\n\nIt is collected annually.".to_string();

    let section = convert_section(&input, &shipped_profile("pa.yaml")).unwrap();
    assert!(section.subsections.is_empty());

    let xml = section_to_akn(&section, input.retrieved_at).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let ps: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name((AKN_NS, "p")))
        .collect();
    assert_eq!(ps.len(), 2);
    assert_eq!(ps[0].text(), Some("A continuing levy applies."));
}

#[test]
fn test_cli_convert_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("72-3116.txt");
    fs::write(&input, load_fixture("pa_72_3116.txt")).unwrap();

    Command::cargo_bin("statute-atlas")
        .unwrap()
        .args([
            "convert",
            input.to_str().unwrap(),
            "--jurisdiction",
            "pa",
            "--section",
            "72-3116",
            "--title",
            "Tax Reform Code",
            "--date",
            "2025-01-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("sec_72_3116__subsec_a"))
        .stdout(predicate::str::contains("akn:akomaNtoso"));
}

#[test]
fn test_cli_convert_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("72-3116.txt");
    let output = dir.path().join("72-3116.xml");
    fs::write(&input, load_fixture("pa_72_3116.txt")).unwrap();

    Command::cargo_bin("statute-atlas")
        .unwrap()
        .args([
            "convert",
            input.to_str().unwrap(),
            "--jurisdiction",
            "pa",
            "--section",
            "72-3116",
            "--date",
            "2025-01-15",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("sec_72_3116__subsec_a__para_1"));
}

#[test]
fn test_cli_convert_rejects_bad_date() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("s.txt");
    fs::write(&input, "(a) Text.").unwrap();

    Command::cargo_bin("statute-atlas")
        .unwrap()
        .args([
            "convert",
            input.to_str().unwrap(),
            "--jurisdiction",
            "pa",
            "--section",
            "1",
            "--date",
            "01-15-2025",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format"));
}

#[test]
fn test_cli_batch_converts_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("sections");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::create_dir(&output_dir).unwrap();

    fs::write(input_dir.join("72-3116.txt"), load_fixture("pa_72_3116.txt")).unwrap();
    fs::write(input_dir.join("72-3117.txt"), "(a) Another rule.").unwrap();

    Command::cargo_bin("statute-atlas")
        .unwrap()
        .args([
            "batch",
            input_dir.to_str().unwrap(),
            "--jurisdiction",
            "pa",
            "--date",
            "2025-01-15",
            "--output",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 converted, 0 failed"));

    assert!(output_dir.join("72-3116.xml").exists());
    let xml = fs::read_to_string(output_dir.join("72-3117.xml")).unwrap();
    assert!(xml.contains("sec_72_3117__subsec_a"));
}

#[test]
fn test_cli_batch_with_profile_file() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("sections");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::create_dir(&output_dir).unwrap();
    fs::write(input_dir.join("40-18-5.txt"), "(1) Levy. (a) Individuals.").unwrap();

    let profile = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("profiles")
        .join("al.yaml");

    Command::cargo_bin("statute-atlas")
        .unwrap()
        .args([
            "batch",
            input_dir.to_str().unwrap(),
            "--jurisdiction",
            "al",
            "--date",
            "2025-01-15",
            "--profile",
            profile.to_str().unwrap(),
            "--output",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let xml = fs::read_to_string(output_dir.join("40-18-5.xml")).unwrap();
    assert!(xml.contains("sec_40_18_5__subsec_1"));
}
