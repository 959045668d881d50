use super::*;
use citesync_core::{BibDatabase, BibEntry, BibliographicDatabase};

use crate::document::memory::Segment;
use crate::document::{CitationText, MemoryDocument};
use crate::error::DocumentError;

const AUTHOR_YEAR: &str = r#"
NAME
Author-year

PROPERTIES
Title=References
IsSortByPosition=false
IsNumberEntries=false

CITATION
MaxAuthors=3
MaxAuthorsFirst=5

LAYOUT
default=\author (\year\uniq). \title.
"#;

const NUMERIC: &str = r#"
NAME
Numeric

PROPERTIES
IsSortByPosition=true
IsNumberEntries=true

CITATION
BracketBefore=[
BracketAfter=]

LAYOUT
default=\author. \title.
"#;

fn database() -> BibDatabase {
    BibDatabase::new("refs")
        .with_entry(
            BibEntry::new("Smith2005", "article")
                .with_field("author", "Smith, John")
                .with_field("year", "2005")
                .with_field("title", "Alpha"),
        )
        .with_entry(
            BibEntry::new("Adams1999", "book")
                .with_field("author", "Adams, Ann")
                .with_field("year", "1999")
                .with_field("title", "Beta"),
        )
        .with_entry(
            BibEntry::new("Many2001", "article")
                .with_field("author", "Alpha, A. and Beta, B. and Gamma, G. and Delta, D.")
                .with_field("year", "2001")
                .with_field("title", "Gamma"),
        )
        .with_entry(
            BibEntry::new("Anon2016", "misc")
                .with_field("year", "2016")
                .with_field("title", "Delta"),
        )
}

fn run<T>(
    doc: &mut MemoryDocument,
    style_src: &str,
    f: impl FnOnce(&mut SyncController<MemoryDocument>) -> T,
) -> T {
    let style = Style::from_jstyle(style_src).unwrap();
    let db = database();
    let databases: Vec<&dyn BibliographicDatabase> = vec![&db];
    let mut controller = SyncController::new(doc, SyncContext::new(&style, &databases));
    f(&mut controller)
}

fn mark_content(doc: &MemoryDocument, name: &str) -> CitationText {
    doc.body
        .iter()
        .find_map(|segment| match segment {
            Segment::Mark(mark) if mark.name == name => Some(mark.content.clone()),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_refresh_inserts_page_info() {
    let mut doc = MemoryDocument::new()
        .text("See ")
        .mark("JR_cite_1_Smith2005")
        .text(".");
    doc.set_page_info("JR_cite_1_Smith2005", Some("p. 4")).unwrap();

    let report = run(&mut doc, AUTHOR_YEAR, |c| c.refresh()).unwrap();
    assert_eq!(report.markers["JR_cite_1_Smith2005"], "(Smith, 2005; p. 4)");
    assert_eq!(doc.mark_text("JR_cite_1_Smith2005").unwrap(), "(Smith, 2005; p. 4)");

    let bibliography = doc.bibliography.clone().unwrap();
    assert_eq!(bibliography.title, "References");
    assert_eq!(bibliography.entries.len(), 1);
    assert_eq!(bibliography.entries[0].text, "Smith, John (2005). Alpha.");
}

#[test]
fn test_first_appearance_cap_and_unresolved() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Many2001")
        .text(" and later ")
        .mark("JR_cite_2_Many2001,ghost");

    let report = run(&mut doc, AUTHOR_YEAR, |c| c.refresh()).unwrap();
    assert_eq!(
        report.markers["JR_cite_1_Many2001"],
        "(Alpha, Beta, Gamma & Delta, 2001)"
    );
    // The undefined key has no year, so it sorts first.
    assert_eq!(
        report.markers["JR_cite_2_Many2001,ghost"],
        "??; Alpha et al. (2001)"
    );
    assert_eq!(report.unresolved_keys, vec!["ghost"]);
    assert_eq!(report.bibliography_entries, 1);
}

#[test]
fn test_invisible_citation_is_empty_but_listed() {
    let mut doc = MemoryDocument::new().mark("JR_cite_3_Adams1999");
    let report = run(&mut doc, AUTHOR_YEAR, |c| c.refresh()).unwrap();
    assert_eq!(report.markers["JR_cite_3_Adams1999"], "");
    assert_eq!(report.bibliography_entries, 1);
}

#[test]
fn test_missing_character_format_leaves_document_untouched() {
    let style = AUTHOR_YEAR.replace(
        "MaxAuthorsFirst=5",
        "MaxAuthorsFirst=5\nFormatCitations=true\nCitationCharacterFormat=Citation\nBoldCitations=true",
    );
    let mut doc = MemoryDocument::new()
        .text("See ")
        .mark("JR_cite_1_Smith2005");
    let before = doc.clone();

    let err = run(&mut doc, &style, |c| c.refresh()).unwrap_err();
    assert!(matches!(err, SyncError::UndefinedCharacterFormat(ref f) if f == "Citation"));
    assert_eq!(doc, before);

    let mut doc = doc.with_character_format("Citation");
    run(&mut doc, &style, |c| c.refresh()).unwrap();
    let format = mark_content(&doc, "JR_cite_1_Smith2005").format.unwrap();
    assert_eq!(format.style_name, "Citation");
    assert!(format.bold);
}

#[test]
fn test_connection_lost() {
    let mut doc = MemoryDocument::new().mark("JR_cite_1_Smith2005");
    doc.disconnect();
    let err = run(&mut doc, AUTHOR_YEAR, |c| c.refresh()).unwrap_err();
    assert!(matches!(err, SyncError::ConnectionLost));
}

#[test]
fn test_malformed_marks_are_skipped() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Smith2005,Adams1999")
        .text(" ")
        .mark("Bookmark")
        .text(" ")
        .mark("JR_cite_7_Smith2005")
        .text(" ")
        .mark("JR_cite_2_Many2001,Smith2005");

    let keys = run(&mut doc, AUTHOR_YEAR, |c| c.cited_keys()).unwrap();
    assert_eq!(keys, vec!["Smith2005", "Adams1999", "Many2001"]);

    let report = run(&mut doc, AUTHOR_YEAR, |c| c.refresh()).unwrap();
    assert_eq!(report.markers.len(), 2);
    assert_eq!(doc.mark_text("Bookmark").unwrap(), "");
    assert_eq!(doc.mark_text("JR_cite_7_Smith2005").unwrap(), "");
}

#[test]
fn test_insert_citation_sorts_keys_and_avoids_collisions() {
    let mut doc = MemoryDocument::new().text("Text ");

    let first = run(&mut doc, AUTHOR_YEAR, |c| {
        c.insert_citation(
            &["Smith2005", "Adams1999"],
            CitationType::Parenthetical,
            None,
            false,
        )
    })
    .unwrap();
    assert_eq!(first.mark_name, "JR_cite_1_Adams1999,Smith2005");
    assert!(first.refresh.is_none());
    assert_eq!(
        doc.mark_text(&first.mark_name).unwrap(),
        "(Adams, 1999; Smith, 2005)"
    );

    let second = run(&mut doc, AUTHOR_YEAR, |c| {
        c.insert_citation(
            &["Adams1999", "Smith2005"],
            CitationType::Parenthetical,
            None,
            false,
        )
    })
    .unwrap();
    assert_eq!(second.mark_name, "JR_cite0_1_Adams1999,Smith2005");

    let third = run(&mut doc, AUTHOR_YEAR, |c| {
        c.insert_citation(&["Many2001"], CitationType::InText, Some("p. 7"), true)
    })
    .unwrap();
    let report = third.refresh.unwrap();
    assert_eq!(
        report.markers[&third.mark_name],
        "Alpha, Beta, Gamma & Delta (2001; p. 7)"
    );
    assert_eq!(doc.page_info(&third.mark_name).unwrap().as_deref(), Some("p. 7"));
    assert_eq!(report.bibliography_entries, 3);
}

#[test]
fn test_insert_numeric_citation_is_provisional() {
    let mut doc = MemoryDocument::new();
    let outcome = run(&mut doc, NUMERIC, |c| {
        c.insert_citation(&["Smith2005"], CitationType::Parenthetical, None, false)
    })
    .unwrap();
    assert_eq!(doc.mark_text(&outcome.mark_name).unwrap(), PROVISIONAL_NUMERIC_MARKER);

    run(&mut doc, NUMERIC, |c| c.refresh()).unwrap();
    assert_eq!(doc.mark_text(&outcome.mark_name).unwrap(), "[1]");
}

#[test]
fn test_insert_without_keys() {
    let mut doc = MemoryDocument::new();
    let err = run(&mut doc, AUTHOR_YEAR, |c| {
        c.insert_citation(&[], CitationType::Parenthetical, None, true)
    })
    .unwrap_err();
    assert!(matches!(err, SyncError::EmptyCitation));
    assert!(doc.mark_names().unwrap().is_empty());
}

#[test]
fn test_rebuild_bibliography_only() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Smith2005")
        .mark("JR_cite_1_Adams1999");
    let count = run(&mut doc, AUTHOR_YEAR, |c| c.rebuild_bibliography()).unwrap();
    assert_eq!(count, 2);
    assert_eq!(doc.mark_text("JR_cite_1_Smith2005").unwrap(), "");

    let keys: Vec<_> = doc
        .bibliography
        .unwrap()
        .entries
        .into_iter()
        .map(|p| p.key)
        .collect();
    assert_eq!(keys, vec!["Adams1999", "Smith2005"]);
}

#[test]
fn test_entry_without_author_has_no_dangling_separator() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Anon2016")
        .text(" and ")
        .mark("JR_cite_2_Anon2016");

    let report = run(&mut doc, AUTHOR_YEAR, |c| c.refresh()).unwrap();
    assert_eq!(report.markers["JR_cite_1_Anon2016"], "(2016)");
    assert_eq!(report.markers["JR_cite_2_Anon2016"], "(2016)");
}

#[test]
fn test_remove_citation_renumbers() {
    let mut doc = MemoryDocument::new()
        .mark("JR_cite_1_Adams1999")
        .text(" then ")
        .mark("JR_cite_1_Smith2005");
    doc.set_page_info("JR_cite_1_Adams1999", Some("p. 1")).unwrap();
    run(&mut doc, NUMERIC, |c| c.refresh()).unwrap();
    assert_eq!(doc.mark_text("JR_cite_1_Smith2005").unwrap(), "[2]");

    let report = run(&mut doc, NUMERIC, |c| c.remove_citation("JR_cite_1_Adams1999", true))
        .unwrap()
        .unwrap();
    assert_eq!(report.markers["JR_cite_1_Smith2005"], "[1]");
    assert_eq!(report.bibliography_entries, 1);
    assert_eq!(doc.mark_names().unwrap(), vec!["JR_cite_1_Smith2005"]);
    assert_eq!(doc.page_info("JR_cite_1_Adams1999").unwrap(), None);

    let err = run(&mut doc, NUMERIC, |c| c.remove_citation("JR_cite_1_Adams1999", false))
        .unwrap_err();
    assert!(matches!(err, SyncError::Document(DocumentError::NoSuchMark(_))));
}
