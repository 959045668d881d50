/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

mod common;
use common::*;

use citesync_core::Style;
use citesync_processor::{DocumentAnchorStore, MemoryDocument};

fn uniquefier_document() -> MemoryDocument {
    MemoryDocument::new()
        .text("First ")
        .mark("JR_cite_1_Smith2005a")
        .text(" and ")
        .mark("JR_cite_1_Jones2010")
        .text(", then both ")
        .mark("JR_cite_1_Smith2005b,Smith2005a")
        .text(". As ")
        .mark("JR_cite_2_Smith2005b")
        .text(" says.")
}

#[test]
fn test_uniquefiers_and_grouping() {
    let mut doc = uniquefier_document();
    let report = refresh(&mut doc, &author_year_style());

    let markers: Vec<&str> = report.markers.values().map(String::as_str).collect();
    assert_eq!(
        markers,
        vec![
            "(Smith, 2005a)",
            "(Jones & Brown, 2010)",
            "(Smith, 2005a,b)",
            "Smith (2005b)",
        ]
    );
    assert!(report.unresolved_keys.is_empty());
}

#[test]
fn test_uniquefiers_follow_document_order() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Smith2005b")
        .text(" ")
        .mark("JR_cite_1_Smith2005a");
    let report = refresh(&mut doc, &author_year_style());

    assert_eq!(report.markers["JR_cite_1_Smith2005b"], "(Smith, 2005a)");
    assert_eq!(report.markers["JR_cite_1_Smith2005a"], "(Smith, 2005b)");
}

#[test]
fn test_unique_key_gets_no_suffix() {
    // Smith2005 shares surname and year with the others but is the only
    // one cited.
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Smith2005")
        .text(" ")
        .mark("JR_cite_1_Beta2000");
    let report = refresh(&mut doc, &author_year_style());

    assert_eq!(report.markers["JR_cite_1_Smith2005"], "(Smith, 2005)");
    assert_eq!(report.markers["JR_cite_1_Beta2000"], "(von Beta, 2000)");
}

#[test]
fn test_bibliography_carries_uniquefiers() {
    let mut doc = uniquefier_document();
    let report = refresh(&mut doc, &author_year_style());
    assert_eq!(report.bibliography_entries, 3);

    let bibliography = doc.bibliography.clone().expect("bibliography written");
    assert_eq!(bibliography.title, "References");
    assert_eq!(bibliography.paragraph_format, "Bibliography 1");
    let keys: Vec<&str> = bibliography.entries.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["Jones2010", "Smith2005a", "Smith2005b"]);
    assert_eq!(
        bibliography.entries[1].text,
        "Smith, John (2005a). First Study."
    );
    assert_eq!(
        bibliography.entries[2].text,
        "Smith, John (2005b). Second Study."
    );
}

#[test]
fn test_refresh_is_idempotent() {
    let style = author_year_style();
    let mut doc = uniquefier_document();
    doc.set_page_info("JR_cite_2_Smith2005b", Some("p. 12"))
        .unwrap();

    let first_report = refresh(&mut doc, &style);
    let after_first = doc.clone();
    let second_report = refresh(&mut doc, &style);

    assert_eq!(first_report, second_report);
    assert_eq!(doc, after_first);
    assert_eq!(
        doc.mark_text("JR_cite_2_Smith2005b").unwrap(),
        "Smith (2005b; p. 12)"
    );
}

#[test]
fn test_unresolved_key_reported_once() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_nowhere")
        .text(" and ")
        .mark("JR_cite_1_Smith2005,nowhere")
        .text(" and ")
        .mark("JR_cite_2_nowhere");
    let report = refresh(&mut doc, &author_year_style());

    assert_eq!(report.unresolved_keys, vec!["nowhere"]);
    assert_eq!(report.markers["JR_cite_1_nowhere"], "(??)");
    assert_eq!(report.markers["JR_cite_1_Smith2005,nowhere"], "(??; Smith, 2005)");
    assert_eq!(report.markers["JR_cite_2_nowhere"], "??");

    let bibliography = doc.bibliography.expect("bibliography written");
    assert_eq!(bibliography.entries.len(), 1);
    assert_eq!(bibliography.entries[0].key, "Smith2005");
}

#[test]
fn test_key_citations() {
    let src = AUTHOR_YEAR_STYLE.replace("UniquefierSeparator=,", "BibTeXKeyCitations=true");
    let style = Style::from_jstyle(&src).unwrap();
    let mut doc = MemoryDocument::new().mark("JR_cite_1_Smith2005b,Smith2005a");
    let report = refresh(&mut doc, &style);

    assert_eq!(
        report.markers["JR_cite_1_Smith2005b,Smith2005a"],
        "Smith2005b,Smith2005a"
    );
}

#[test]
fn test_empty_document() {
    let mut doc = MemoryDocument::new().text("Nothing cited.");
    let report = refresh(&mut doc, &author_year_style());
    assert!(report.markers.is_empty());
    assert_eq!(report.bibliography_entries, 0);
    assert_eq!(doc.bibliography.map(|b| b.entries.len()), Some(0));
}
