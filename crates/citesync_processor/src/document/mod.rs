/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! The document side of synchronization.
//!
//! The engine never touches a concrete word-processor API. Everything it
//! needs from a document goes through [`DocumentAnchorStore`].

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

pub use self::memory::MemoryDocument;

/// Where a mark sits, for ordering.
///
/// Marks in the main text flow order by their offset. A mark inside a
/// footnote orders by the offset of the footnote's anchor in the main flow,
/// then by its offset inside the footnote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkPosition {
    pub main_offset: usize,
    pub footnote_offset: Option<usize>,
}

impl MarkPosition {
    pub fn body(offset: usize) -> Self {
        Self {
            main_offset: offset,
            footnote_offset: None,
        }
    }

    pub fn footnote(anchor_offset: usize, offset: usize) -> Self {
        Self {
            main_offset: anchor_offset,
            footnote_offset: Some(offset),
        }
    }
}

/// Where a new mark goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkAnchor {
    /// At the current cursor.
    Cursor,
    /// Replacing the span from the start of `first` to the end of `last`,
    /// both marks included.
    Covering { first: String, last: String },
}

/// Character formatting requested for a citation's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CharacterFormat {
    /// Named character style to apply.
    pub style_name: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub superscript: bool,
    #[serde(default)]
    pub subscript: bool,
}

/// Text to place inside a mark, with optional formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CitationText {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CharacterFormat>,
    /// Byte range of `text` to italicise, used for "et al.".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic_range: Option<(usize, usize)>,
}

impl CitationText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A paragraph of generated bibliography content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BibliographyParagraph {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub text: String,
}

/// The generated reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BibliographySection {
    pub title: String,
    pub header_format: String,
    pub paragraph_format: String,
    #[serde(default)]
    pub entries: Vec<BibliographyParagraph>,
}

impl BibliographySection {
    /// Plain-text rendering, one paragraph per line.
    pub fn to_plain_text(&self) -> String {
        let mut out = self.title.clone();
        for entry in &self.entries {
            out.push('\n');
            if let Some(label) = &entry.label {
                out.push_str(label);
                out.push(' ');
            }
            out.push_str(&entry.text);
        }
        out
    }
}

/// Named, positioned anchors in a document, plus the few document-wide
/// facilities citation maintenance needs.
///
/// Every method may fail with [`DocumentError::ConnectionLost`] if the
/// document went away.
pub trait DocumentAnchorStore {
    /// All mark names in the document, in any order.
    fn mark_names(&self) -> Result<Vec<String>, DocumentError>;

    fn has_mark(&self, name: &str) -> Result<bool, DocumentError> {
        Ok(self.mark_names()?.iter().any(|n| n == name))
    }

    fn mark_position(&self, name: &str) -> Result<MarkPosition, DocumentError>;

    fn mark_text(&self, name: &str) -> Result<String, DocumentError>;

    fn set_mark_text(&mut self, name: &str, text: &CitationText) -> Result<(), DocumentError>;

    fn create_mark(
        &mut self,
        name: &str,
        text: &CitationText,
        anchor: MarkAnchor,
    ) -> Result<(), DocumentError>;

    /// Remove a mark together with its text.
    fn delete_mark(&mut self, name: &str) -> Result<(), DocumentError>;

    /// The text strictly between the end of `first` and the start of
    /// `second`, or `None` when they are in different text flows or out
    /// of order.
    fn text_between(&self, first: &str, second: &str) -> Result<Option<String>, DocumentError>;

    fn has_character_format(&self, name: &str) -> Result<bool, DocumentError>;

    /// Page info stored against a mark name, if any.
    fn page_info(&self, mark: &str) -> Result<Option<String>, DocumentError>;

    fn set_page_info(&mut self, mark: &str, info: Option<&str>) -> Result<(), DocumentError>;

    fn clear_bibliography(&mut self) -> Result<(), DocumentError>;

    fn insert_bibliography(&mut self, section: &BibliographySection) -> Result<(), DocumentError>;
}
