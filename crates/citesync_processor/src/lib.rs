/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Citesync Processor
//!
//! Keeps the citations in a document consistent with a citation style and
//! a list of bibliographic databases. Citations live in the document as
//! named marks (`JR_cite_1_Smith2005`); the processor reads those marks,
//! resolves their keys, writes back the marker text for every mark and
//! regenerates the bibliography.
//!
//! The document is reached only through the [`DocumentAnchorStore`] trait,
//! so any editor backend can be plugged in. [`MemoryDocument`] is an
//! in-memory implementation that can be saved as YAML or JSON.
//!
//! # Example
//!
//! ```rust
//! use citesync_core::{BibDatabase, BibEntry, BibliographicDatabase, Style};
//! use citesync_processor::{MemoryDocument, SyncContext, SyncController};
//!
//! let style = Style::from_jstyle(r#"
//! NAME
//! Example
//! CITATION
//! BracketBefore=[
//! BracketAfter=]
//! LAYOUT
//! default=\author (\year). \title.
//! "#).unwrap();
//!
//! let db = BibDatabase::new("refs").with_entry(
//!     BibEntry::new("kuhn1962", "book")
//!         .with_field("author", "Kuhn, Thomas")
//!         .with_field("year", "1962")
//!         .with_field("title", "The Structure of Scientific Revolutions"),
//! );
//! let databases: Vec<&dyn BibliographicDatabase> = vec![&db];
//!
//! let mut doc = MemoryDocument::new()
//!     .text("As argued ")
//!     .mark("JR_cite_1_kuhn1962")
//!     .text(".");
//!
//! let report = SyncController::new(&mut doc, SyncContext::new(&style, &databases))
//!     .refresh()
//!     .unwrap();
//! assert_eq!(report.markers["JR_cite_1_kuhn1962"], "[Kuhn, 1962]");
//! assert!(report.unresolved_keys.is_empty());
//! ```

pub mod context;
pub mod document;
pub mod error;
pub mod io;
pub mod resolver;
pub mod sync;

pub use context::SyncContext;
pub use document::{
    BibliographyParagraph, BibliographySection, CharacterFormat, CitationText,
    DocumentAnchorStore, MarkAnchor, MarkPosition, MemoryDocument,
};
pub use error::{DocumentError, SyncError};
pub use resolver::{EntryResolver, ResolvedEntry};
pub use sync::marker::{CitationMode, MarkerFormatter};
pub use sync::merge::MergeEngine;
pub use sync::numbering::{compress_numbers, NumberAssigner, NumberMap, NumberingOrder};
pub use sync::uniquefier::{UniquefierAssigner, UniquefierMap};
pub use sync::{
    cited_keys, CitationMark, InsertOutcome, MergeOutcome, RefreshReport, SyncController,
};
