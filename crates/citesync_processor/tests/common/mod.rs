/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

#![allow(dead_code)]

use citesync_core::{BibDatabase, BibEntry, BibliographicDatabase, Style};
use citesync_processor::document::memory::{MarkSegment, Segment};
use citesync_processor::{
    CitationText, MemoryDocument, RefreshReport, SyncContext, SyncController, SyncError,
};

// --- Styles ---

pub const AUTHOR_YEAR_STYLE: &str = r#"
NAME
Author-year test style

PROPERTIES
Title=References
IsSortByPosition=false
IsNumberEntries=false
ReferenceParagraphFormat=Bibliography 1

CITATION
AuthorField=author/editor
YearField=year
MaxAuthors=3
AuthorLastSeparator=" & "
EtAlString=" et al."
BracketBefore=(
BracketAfter=)
UniquefierSeparator=,

LAYOUT
default=\format[AuthorLastFirst,AuthorAndsReplacer]{\author} (\year\uniq). \title.
"#;

/// A numeric style numbering by first citation.
pub fn numeric_style_source(minimum_grouping_count: i64, by_position: bool) -> String {
    format!(
        r#"
NAME
Numeric test style

PROPERTIES
Title=References
IsSortByPosition={by_position}
IsNumberEntries=true

CITATION
BracketBefore=[
BracketAfter=]
CitationSeparator=,
GroupedNumbersSeparator=-
MinimumGroupingCount={minimum_grouping_count}

LAYOUT
default=\author. \title.
"#
    )
}

pub fn author_year_style() -> Style {
    Style::from_jstyle(AUTHOR_YEAR_STYLE).expect("author-year style parses")
}

pub fn numeric_style(minimum_grouping_count: i64) -> Style {
    Style::from_jstyle(&numeric_style_source(minimum_grouping_count, true))
        .expect("numeric style parses")
}

// --- Data ---

pub fn make_entry(key: &str, author: &str, year: &str, title: &str) -> BibEntry {
    BibEntry::new(key, "article")
        .with_field("author", author)
        .with_field("year", year)
        .with_field("title", title)
}

pub fn database() -> BibDatabase {
    BibDatabase::new("main.bib")
        .with_entry(make_entry("Smith2005", "Smith, Adam", "2005", "Wealth"))
        .with_entry(make_entry("Smith2005a", "Smith, John", "2005", "First Study"))
        .with_entry(make_entry("Smith2005b", "Smith, John", "2005", "Second Study"))
        .with_entry(make_entry(
            "Jones2010",
            "Jones, Mary and Brown, Bob",
            "2010",
            "A Joint Paper",
        ))
        .with_entry(make_entry("Beta2000", "Alpha von Beta", "2000", "Particles"))
}

/// `K1` to `Kn`, with authors that sort in key order.
pub fn numbered_database(n: usize) -> BibDatabase {
    (1..=n).fold(BibDatabase::new("numbered.bib"), |db, i| {
        db.with_entry(make_entry(
            &format!("K{i}"),
            &format!("Author{i:02}, A."),
            "2000",
            &format!("Title {i}"),
        ))
    })
}

// --- Documents ---

pub fn mark_segment(name: &str) -> Segment {
    Segment::Mark(MarkSegment {
        name: name.to_string(),
        content: CitationText::default(),
    })
}

pub fn text_segment(text: &str) -> Segment {
    Segment::Text(text.to_string())
}

// --- Running ---

pub fn refresh_with(
    doc: &mut MemoryDocument,
    style: &Style,
    db: &BibDatabase,
) -> Result<RefreshReport, SyncError> {
    let databases: Vec<&dyn BibliographicDatabase> = vec![db];
    SyncController::new(doc, SyncContext::new(style, &databases)).refresh()
}

pub fn refresh(doc: &mut MemoryDocument, style: &Style) -> RefreshReport {
    refresh_with(doc, style, &database()).expect("refresh succeeds")
}
