/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Citation styles.
//!
//! A style can be written in the legacy `.jstyle` format or as YAML with
//! the same property names:
//!
//! ```yaml
//! name: Example
//! properties:
//!   Title: References
//!   IsNumberEntries: true
//! citation:
//!   BracketBefore: "["
//!   BracketAfter: "]"
//! layout:
//!   default: \author (\year). \title.
//! ```
//!
//! Both are read into a [`RawStyle`] and then validated into a typed
//! [`Style`].

pub mod jstyle;
pub mod layout;

use indexmap::IndexMap;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use self::layout::{Layout, LayoutNode};
use crate::error::StyleError;

/// A property value as written in a style file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PropertyValue {
    fn as_display(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Str(s) => s.clone(),
        }
    }
}

/// A style before validation: sections as read from the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RawStyle {
    pub name: Option<String>,
    #[serde(default)]
    pub journals: Vec<String>,
    /// Global properties.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
    /// Citation-marker properties.
    #[serde(default)]
    pub citation: IndexMap<String, PropertyValue>,
    /// Entry type (lowercase) to layout template; `default` is required.
    #[serde(default)]
    pub layout: IndexMap<String, String>,
}

/// Properties that control how citation markers are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationProperties {
    /// Field chain for the author part, e.g. `author/editor`.
    pub author_field: String,
    pub year_field: String,
    /// Authors listed before switching to "et al."; negative means no limit.
    pub max_authors: i64,
    /// Overrides `max_authors` on an entry's first citation when positive.
    pub max_authors_first: i64,
    pub author_separator: String,
    pub author_last_separator: String,
    pub author_last_separator_in_text: Option<String>,
    pub et_al_string: String,
    pub year_separator: String,
    pub in_text_year_separator: String,
    pub bracket_before: String,
    pub bracket_after: String,
    pub bracket_before_in_list: Option<String>,
    pub bracket_after_in_list: Option<String>,
    pub citation_separator: String,
    pub page_info_separator: String,
    pub grouped_numbers_separator: String,
    /// Runs of consecutive numbers at least this long collapse to a range.
    /// Zero or negative disables ranges.
    pub minimum_grouping_count: i64,
    pub uniquefier_separator: String,
    pub format_citations: bool,
    pub citation_character_format: String,
    pub italic_citations: bool,
    pub bold_citations: bool,
    pub superscript_citations: bool,
    pub subscript_citations: bool,
    pub italic_et_al: bool,
    pub multi_cite_chronological: bool,
    pub bibtex_key_citations: bool,
}

impl Default for CitationProperties {
    fn default() -> Self {
        Self {
            author_field: "author/editor".into(),
            year_field: "year".into(),
            max_authors: 3,
            max_authors_first: -1,
            author_separator: ", ".into(),
            author_last_separator: " & ".into(),
            author_last_separator_in_text: None,
            et_al_string: " et al.".into(),
            year_separator: ", ".into(),
            in_text_year_separator: " ".into(),
            bracket_before: "(".into(),
            bracket_after: ")".into(),
            bracket_before_in_list: None,
            bracket_after_in_list: None,
            citation_separator: "; ".into(),
            page_info_separator: "; ".into(),
            grouped_numbers_separator: "-".into(),
            minimum_grouping_count: 3,
            uniquefier_separator: ",".into(),
            format_citations: false,
            citation_character_format: "Default".into(),
            italic_citations: false,
            bold_citations: false,
            superscript_citations: false,
            subscript_citations: false,
            italic_et_al: false,
            multi_cite_chronological: true,
            bibtex_key_citations: false,
        }
    }
}

impl CitationProperties {
    pub fn bracket_before_in_list(&self) -> &str {
        self.bracket_before_in_list
            .as_deref()
            .unwrap_or(&self.bracket_before)
    }

    pub fn bracket_after_in_list(&self) -> &str {
        self.bracket_after_in_list
            .as_deref()
            .unwrap_or(&self.bracket_after)
    }

    pub fn author_last_separator_in_text(&self) -> &str {
        self.author_last_separator_in_text
            .as_deref()
            .unwrap_or(&self.author_last_separator)
    }
}

/// A validated citation style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub name: String,
    pub journals: Vec<String>,
    /// Bibliography heading.
    pub title: String,
    pub is_sort_by_position: bool,
    pub is_number_entries: bool,
    pub reference_paragraph_format: String,
    pub reference_header_paragraph_format: String,
    pub citation: CitationProperties,
    /// Layouts by lowercase entry type; always contains `default`.
    pub layouts: IndexMap<String, Layout>,
}

impl Style {
    pub fn from_jstyle(src: &str) -> Result<Self, StyleError> {
        Self::from_raw(jstyle::parse(src)?)
    }

    pub fn from_yaml(src: &str) -> Result<Self, StyleError> {
        let raw: RawStyle = serde_yaml::from_str(src)
            .map_err(|e| StyleError::ParseError("YAML".to_string(), e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_json(src: &str) -> Result<Self, StyleError> {
        let raw: RawStyle = serde_json::from_str(src)
            .map_err(|e| StyleError::ParseError("JSON".to_string(), e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Validate raw sections, filling in defaults for absent properties.
    pub fn from_raw(raw: RawStyle) -> Result<Self, StyleError> {
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| StyleError::MissingProperty("NAME".to_string()))?;

        let mut layouts = IndexMap::new();
        for (entry_type, source) in &raw.layout {
            let entry_type = entry_type.to_lowercase();
            let layout = Layout::parse(&entry_type, source)?;
            layouts.insert(entry_type, layout);
        }
        if !layouts.contains_key("default") {
            return Err(StyleError::MissingProperty("default layout".to_string()));
        }

        let global = Properties(&raw.properties);
        let cit = Properties(&raw.citation);
        let defaults = CitationProperties::default();

        let citation = CitationProperties {
            author_field: cit.string("AuthorField", &defaults.author_field),
            year_field: cit.string("YearField", &defaults.year_field),
            max_authors: cit.int("MaxAuthors", defaults.max_authors)?,
            max_authors_first: cit.int("MaxAuthorsFirst", defaults.max_authors_first)?,
            author_separator: cit.string("AuthorSeparator", &defaults.author_separator),
            author_last_separator: cit
                .string("AuthorLastSeparator", &defaults.author_last_separator),
            author_last_separator_in_text: cit.optional_string("AuthorLastSeparatorInText"),
            et_al_string: cit.string("EtAlString", &defaults.et_al_string),
            year_separator: cit.string("YearSeparator", &defaults.year_separator),
            in_text_year_separator: cit
                .string("InTextYearSeparator", &defaults.in_text_year_separator),
            bracket_before: cit.string("BracketBefore", &defaults.bracket_before),
            bracket_after: cit.string("BracketAfter", &defaults.bracket_after),
            bracket_before_in_list: cit.optional_string("BracketBeforeInList"),
            bracket_after_in_list: cit.optional_string("BracketAfterInList"),
            citation_separator: cit.string("CitationSeparator", &defaults.citation_separator),
            page_info_separator: cit.string("PageInfoSeparator", &defaults.page_info_separator),
            grouped_numbers_separator: cit
                .string("GroupedNumbersSeparator", &defaults.grouped_numbers_separator),
            minimum_grouping_count: cit
                .int("MinimumGroupingCount", defaults.minimum_grouping_count)?,
            uniquefier_separator: cit
                .string("UniquefierSeparator", &defaults.uniquefier_separator),
            format_citations: cit.bool("FormatCitations", defaults.format_citations)?,
            citation_character_format: cit
                .string("CitationCharacterFormat", &defaults.citation_character_format),
            italic_citations: cit.bool("ItalicCitations", defaults.italic_citations)?,
            bold_citations: cit.bool("BoldCitations", defaults.bold_citations)?,
            superscript_citations: cit
                .bool("SuperscriptCitations", defaults.superscript_citations)?,
            subscript_citations: cit.bool("SubscriptCitations", defaults.subscript_citations)?,
            italic_et_al: cit.bool("ItalicEtAl", defaults.italic_et_al)?,
            multi_cite_chronological: cit
                .bool("MultiCiteChronological", defaults.multi_cite_chronological)?,
            bibtex_key_citations: cit.bool("BibTeXKeyCitations", defaults.bibtex_key_citations)?,
        };

        let style = Style {
            name: name.trim().to_string(),
            journals: raw.journals,
            title: global.string("Title", "Bibliography"),
            is_sort_by_position: global.bool("IsSortByPosition", false)?,
            is_number_entries: global.bool("IsNumberEntries", false)?,
            reference_paragraph_format: global.string("ReferenceParagraphFormat", "Default"),
            reference_header_paragraph_format: global
                .string("ReferenceHeaderParagraphFormat", "Heading 1"),
            citation,
            layouts,
        };
        tracing::debug!(style = %style.name, numeric = style.is_number_entries, "loaded style");
        Ok(style)
    }

    /// Citations render as numbers rather than author-year text.
    pub fn is_numeric(&self) -> bool {
        self.is_number_entries
    }

    /// The layout for an entry type, falling back to `default`.
    pub fn layout_for(&self, entry_type: &str) -> Option<&Layout> {
        self.layouts
            .get(&entry_type.to_lowercase())
            .or_else(|| self.layouts.get("default"))
    }
}

struct Properties<'a>(&'a IndexMap<String, PropertyValue>);

impl Properties<'_> {
    fn string(&self, name: &str, default: &str) -> String {
        self.optional_string(name)
            .unwrap_or_else(|| default.to_string())
    }

    fn optional_string(&self, name: &str) -> Option<String> {
        self.0.get(name).map(PropertyValue::as_display)
    }

    fn int(&self, name: &str, default: i64) -> Result<i64, StyleError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(PropertyValue::Int(i)) => Ok(*i),
            Some(other) => Err(invalid(name, other, "an integer")),
        }
    }

    fn bool(&self, name: &str, default: bool) -> Result<bool, StyleError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(PropertyValue::Bool(b)) => Ok(*b),
            Some(other) => Err(invalid(name, other, "true or false")),
        }
    }
}

fn invalid(name: &str, value: &PropertyValue, expected: &'static str) -> StyleError {
    StyleError::InvalidProperty {
        name: name.to_string(),
        value: value.as_display(),
        expected,
    }
}
