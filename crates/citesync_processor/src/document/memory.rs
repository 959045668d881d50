/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! An in-memory document.
//!
//! Serializes to YAML/JSON so a document can be saved, edited by hand and
//! loaded again:
//!
//! ```yaml
//! body:
//!   - text: "As shown by "
//!   - mark: { name: JR_cite_2_Smith2005, text: "" }
//!   - text: ", this holds."
//!   - footnote: "1"
//! footnotes:
//!   "1":
//!     - mark: { name: JR_cite_1_Jones2010, text: "" }
//! properties:
//!   JR_cite_2_Smith2005: "p. 4"
//! character-formats: [Default, Citation]
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    BibliographySection, CitationText, DocumentAnchorStore, MarkAnchor, MarkPosition,
};
use crate::error::DocumentError;

/// Stands in for a footnote anchor in text returned by `text_between`.
const FOOTNOTE_ANCHOR_CHAR: char = '\u{fffc}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSegment {
    pub name: String,
    #[serde(flatten)]
    pub content: CitationText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    Text(String),
    Mark(MarkSegment),
    /// Anchor of the footnote with this id.
    Footnote(String),
}

impl Segment {
    fn len(&self) -> usize {
        match self {
            Segment::Text(text) => text.chars().count(),
            Segment::Mark(mark) => mark.content.text.chars().count(),
            Segment::Footnote(_) => 1,
        }
    }
}

/// A text flow: the body or one footnote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Flow {
    Body,
    Footnote(String),
}

/// Insertion point for new marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Footnote id, or the body when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote: Option<String>,
    /// Segment index to insert before; the end of the flow when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

fn default_formats() -> Vec<String> {
    vec!["Default".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemoryDocument {
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub body: Vec<Segment>,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub footnotes: IndexMap<String, Vec<Segment>>,
    /// Custom document properties; page info lives here keyed by mark name.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    #[serde(default = "default_formats")]
    pub character_formats: Vec<String>,
    #[serde(default)]
    pub cursor: Cursor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibliography: Option<BibliographySection>,
    #[serde(skip)]
    disconnected: bool,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self {
            body: Vec::new(),
            footnotes: IndexMap::new(),
            properties: IndexMap::new(),
            character_formats: default_formats(),
            cursor: Cursor::default(),
            bibliography: None,
            disconnected: false,
        }
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the body.
    pub fn text(mut self, text: &str) -> Self {
        self.body.push(Segment::Text(text.to_string()));
        self
    }

    /// Append an empty mark to the body.
    pub fn mark(mut self, name: &str) -> Self {
        self.body.push(Segment::Mark(MarkSegment {
            name: name.to_string(),
            content: CitationText::default(),
        }));
        self
    }

    /// Append a footnote anchor to the body, with the footnote's content.
    pub fn footnote(mut self, id: &str, content: Vec<Segment>) -> Self {
        self.body.push(Segment::Footnote(id.to_string()));
        self.footnotes.insert(id.to_string(), content);
        self
    }

    pub fn with_character_format(mut self, name: &str) -> Self {
        self.character_formats.push(name.to_string());
        self
    }

    /// Simulate the document going away; every later call fails.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    pub fn reconnect(&mut self) {
        self.disconnected = false;
    }

    /// The body as plain text, footnotes and bibliography appended.
    pub fn to_plain_text(&self) -> String {
        let mut out = flow_text(&self.body, true);
        for (id, content) in &self.footnotes {
            out.push_str(&format!("\n[^{id}]: {}", flow_text(content, true)));
        }
        if let Some(bibliography) = &self.bibliography {
            out.push_str("\n\n");
            out.push_str(&bibliography.to_plain_text());
        }
        out
    }

    fn check_connected(&self) -> Result<(), DocumentError> {
        if self.disconnected {
            Err(DocumentError::ConnectionLost)
        } else {
            Ok(())
        }
    }

    fn flow(&self, flow: &Flow) -> Option<&Vec<Segment>> {
        match flow {
            Flow::Body => Some(&self.body),
            Flow::Footnote(id) => self.footnotes.get(id),
        }
    }

    fn flow_mut(&mut self, flow: &Flow) -> Option<&mut Vec<Segment>> {
        match flow {
            Flow::Body => Some(&mut self.body),
            Flow::Footnote(id) => self.footnotes.get_mut(id),
        }
    }

    fn flows(&self) -> impl Iterator<Item = (Flow, &Vec<Segment>)> {
        std::iter::once((Flow::Body, &self.body)).chain(
            self.footnotes
                .iter()
                .map(|(id, segments)| (Flow::Footnote(id.clone()), segments)),
        )
    }

    fn locate(&self, name: &str) -> Result<(Flow, usize), DocumentError> {
        self.flows()
            .find_map(|(flow, segments)| {
                segments
                    .iter()
                    .position(|s| matches!(s, Segment::Mark(m) if m.name == name))
                    .map(|index| (flow, index))
            })
            .ok_or_else(|| DocumentError::NoSuchMark(name.to_string()))
    }

    fn mark_mut(&mut self, name: &str) -> Result<&mut MarkSegment, DocumentError> {
        let (flow, index) = self.locate(name)?;
        match self.flow_mut(&flow).and_then(|s| s.get_mut(index)) {
            Some(Segment::Mark(mark)) => Ok(mark),
            _ => Err(DocumentError::NoSuchMark(name.to_string())),
        }
    }
}

fn offset_before(segments: &[Segment], index: usize) -> usize {
    segments[..index].iter().map(Segment::len).sum()
}

fn flow_text(segments: &[Segment], footnote_refs: bool) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.clone(),
            Segment::Mark(mark) => mark.content.text.clone(),
            Segment::Footnote(id) if footnote_refs => format!("[^{id}]"),
            Segment::Footnote(_) => FOOTNOTE_ANCHOR_CHAR.to_string(),
        })
        .collect()
}

impl DocumentAnchorStore for MemoryDocument {
    fn mark_names(&self) -> Result<Vec<String>, DocumentError> {
        self.check_connected()?;
        Ok(self
            .flows()
            .flat_map(|(_, segments)| segments.iter())
            .filter_map(|segment| match segment {
                Segment::Mark(mark) => Some(mark.name.clone()),
                _ => None,
            })
            .collect())
    }

    fn mark_position(&self, name: &str) -> Result<MarkPosition, DocumentError> {
        self.check_connected()?;
        let (flow, index) = self.locate(name)?;
        match &flow {
            Flow::Body => Ok(MarkPosition::body(offset_before(&self.body, index))),
            Flow::Footnote(id) => {
                let anchor = self
                    .body
                    .iter()
                    .position(|s| matches!(s, Segment::Footnote(f) if f == id))
                    .ok_or_else(|| {
                        DocumentError::Other(format!("footnote '{id}' has no anchor in the body"))
                    })?;
                let segments = self.flow(&flow).map(Vec::as_slice).unwrap_or_default();
                Ok(MarkPosition::footnote(
                    offset_before(&self.body, anchor),
                    offset_before(segments, index),
                ))
            }
        }
    }

    fn mark_text(&self, name: &str) -> Result<String, DocumentError> {
        self.check_connected()?;
        let (flow, index) = self.locate(name)?;
        match self.flow(&flow).and_then(|s| s.get(index)) {
            Some(Segment::Mark(mark)) => Ok(mark.content.text.clone()),
            _ => Err(DocumentError::NoSuchMark(name.to_string())),
        }
    }

    fn set_mark_text(&mut self, name: &str, text: &CitationText) -> Result<(), DocumentError> {
        self.check_connected()?;
        self.mark_mut(name)?.content = text.clone();
        Ok(())
    }

    fn create_mark(
        &mut self,
        name: &str,
        text: &CitationText,
        anchor: MarkAnchor,
    ) -> Result<(), DocumentError> {
        self.check_connected()?;
        if self.locate(name).is_ok() {
            return Err(DocumentError::DuplicateMark(name.to_string()));
        }
        let segment = Segment::Mark(MarkSegment {
            name: name.to_string(),
            content: text.clone(),
        });

        match anchor {
            MarkAnchor::Cursor => {
                let flow = match &self.cursor.footnote {
                    Some(id) => Flow::Footnote(id.clone()),
                    None => Flow::Body,
                };
                let requested = self.cursor.index;
                let segments = self.flow_mut(&flow).ok_or_else(|| {
                    DocumentError::Other("cursor is in a footnote that does not exist".into())
                })?;
                let index = requested.unwrap_or(segments.len()).min(segments.len());
                segments.insert(index, segment);
                if requested.is_some() {
                    self.cursor.index = Some(index + 1);
                }
            }
            MarkAnchor::Covering { first, last } => {
                let (first_flow, first_index) = self.locate(&first)?;
                let (last_flow, last_index) = self.locate(&last)?;
                if first_flow != last_flow || first_index > last_index {
                    return Err(DocumentError::Other(format!(
                        "cannot cover '{first}' to '{last}': not in order in one text flow"
                    )));
                }
                let segments = self
                    .flow_mut(&first_flow)
                    .ok_or_else(|| DocumentError::NoSuchMark(first.clone()))?;
                segments.drain(first_index..=last_index);
                segments.insert(first_index, segment);
            }
        }
        Ok(())
    }

    fn delete_mark(&mut self, name: &str) -> Result<(), DocumentError> {
        self.check_connected()?;
        let (flow, index) = self.locate(name)?;
        if let Some(segments) = self.flow_mut(&flow) {
            segments.remove(index);
        }
        Ok(())
    }

    fn text_between(&self, first: &str, second: &str) -> Result<Option<String>, DocumentError> {
        self.check_connected()?;
        let (first_flow, first_index) = self.locate(first)?;
        let (second_flow, second_index) = self.locate(second)?;
        if first_flow != second_flow || first_index >= second_index {
            return Ok(None);
        }
        Ok(self
            .flow(&first_flow)
            .map(|segments| flow_text(&segments[first_index + 1..second_index], false)))
    }

    fn has_character_format(&self, name: &str) -> Result<bool, DocumentError> {
        self.check_connected()?;
        Ok(self.character_formats.iter().any(|f| f == name))
    }

    fn page_info(&self, mark: &str) -> Result<Option<String>, DocumentError> {
        self.check_connected()?;
        Ok(self
            .properties
            .get(mark)
            .filter(|info| !info.trim().is_empty())
            .cloned())
    }

    fn set_page_info(&mut self, mark: &str, info: Option<&str>) -> Result<(), DocumentError> {
        self.check_connected()?;
        match info {
            Some(info) => {
                self.properties.insert(mark.to_string(), info.to_string());
            }
            None => {
                self.properties.shift_remove(mark);
            }
        }
        Ok(())
    }

    fn clear_bibliography(&mut self) -> Result<(), DocumentError> {
        self.check_connected()?;
        self.bibliography = None;
        Ok(())
    }

    fn insert_bibliography(&mut self, section: &BibliographySection) -> Result<(), DocumentError> {
        self.check_connected()?;
        self.bibliography = Some(section.clone());
        Ok(())
    }
}
