/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Core data model for citesync.
//!
//! This crate holds the pieces that don't need a document: bibliographic
//! entries and the database trait used to look them up, the legacy
//! `.jstyle` style format (and its YAML equivalent), and the grammar for the
//! reference-mark names that citations are stored under.

pub mod entry;
pub mod error;
pub mod latex;
pub mod mark;
pub mod names;
pub mod style;

pub use entry::{BibDatabase, BibEntry, BibliographicDatabase};
pub use error::{BibError, MarkNameError, StyleError};
pub use mark::{CitationType, MarkName};
pub use names::{Author, AuthorList};
pub use style::{CitationProperties, Layout, Style};

/// Placeholder text shown in place of anything derived from an entry that
/// could not be found in any database.
pub const UNDEFINED_CITATION_MARKER: &str = "??";
