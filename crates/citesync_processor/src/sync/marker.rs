/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Rendering citation markers.

use citesync_core::latex;
use citesync_core::{AuthorList, CitationType, Style, UNDEFINED_CITATION_MARKER};

use super::numbering::compress_numbers;
use crate::document::{CharacterFormat, CitationText};
use crate::resolver::ResolvedEntry;

/// How an author-year marker is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationMode {
    /// `(Smith, 2005; Jones, 2010)`
    Parenthetical,
    /// `Smith (2005); Jones (2010)`
    InText,
}

impl From<CitationType> for CitationMode {
    fn from(kind: CitationType) -> Self {
        match kind {
            CitationType::InText => CitationMode::InText,
            CitationType::Parenthetical | CitationType::Invisible => CitationMode::Parenthetical,
        }
    }
}

pub struct MarkerFormatter<'a> {
    style: &'a Style,
}

impl<'a> MarkerFormatter<'a> {
    pub fn new(style: &'a Style) -> Self {
        Self { style }
    }

    /// Render an author-year marker.
    ///
    /// `uniquefiers` and `author_caps` run parallel to `entries`; missing
    /// positions count as `None`. A positive author cap replaces
    /// `MaxAuthors` for that entry.
    pub fn format(
        &self,
        entries: &[ResolvedEntry],
        mode: CitationMode,
        uniquefiers: &[Option<String>],
        author_caps: &[Option<i64>],
    ) -> String {
        let props = &self.style.citation;
        let mut out = String::new();
        if mode == CitationMode::Parenthetical {
            out.push_str(&props.bracket_before);
        }

        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                out.push_str(&props.citation_separator);
            }
            if !entry.is_resolved() {
                out.push_str(UNDEFINED_CITATION_MARKER);
                continue;
            }

            let cap = author_caps
                .get(i)
                .copied()
                .flatten()
                .filter(|c| *c > 0)
                .unwrap_or(props.max_authors);
            let uniquefier = uniquefiers.get(i).cloned().flatten().unwrap_or_default();
            let year = self.year_part(entry);

            match mode {
                CitationMode::Parenthetical => {
                    let author = self.author_part(entry, cap, &props.author_last_separator);
                    if !author.is_empty() {
                        out.push_str(&author);
                        out.push_str(&props.year_separator);
                    }
                    out.push_str(&year);
                    out.push_str(&uniquefier);
                }
                CitationMode::InText => {
                    let author =
                        self.author_part(entry, cap, props.author_last_separator_in_text());
                    if !author.is_empty() {
                        out.push_str(&author);
                        out.push_str(&props.in_text_year_separator);
                    }
                    out.push_str(&props.bracket_before);
                    out.push_str(&year);
                    out.push_str(&uniquefier);
                    out.push_str(&props.bracket_after);
                }
            }
        }

        if mode == CitationMode::Parenthetical {
            out.push_str(&props.bracket_after);
        }
        out
    }

    /// The marker an entry would get on its own: parenthetical, with no
    /// uniquefier and the style's own author cap. Entries that render the
    /// same here need uniquefiers.
    pub fn normalized(&self, entry: &ResolvedEntry) -> String {
        self.format(
            std::slice::from_ref(entry),
            CitationMode::Parenthetical,
            &[],
            &[],
        )
    }

    /// A bracketed numeric marker, e.g. `[1-3; 7]`.
    pub fn numeric(&self, numbers: &[i32], in_list: bool) -> String {
        let props = &self.style.citation;
        let (before, after) = if in_list {
            (props.bracket_before_in_list(), props.bracket_after_in_list())
        } else {
            (props.bracket_before.as_str(), props.bracket_after.as_str())
        };
        format!("{before}{}{after}", compress_numbers(numbers, props))
    }

    /// The marker used when citations show their keys.
    pub fn key_list(&self, keys: &[&str]) -> String {
        keys.join(",")
    }

    /// Put page info just inside the closing bracket, or after the marker
    /// when it doesn't end in one.
    pub fn insert_page_info(&self, marker: &str, page_info: &str) -> String {
        let props = &self.style.citation;
        let after = props.bracket_after.as_str();
        match marker.strip_suffix(after).filter(|_| !after.is_empty()) {
            Some(body) => format!("{body}{}{page_info}{after}", props.page_info_separator),
            None => format!("{marker}{}{page_info}", props.page_info_separator),
        }
    }

    /// Wrap final marker text with the formatting the style asks for.
    pub fn citation_text(&self, text: String) -> CitationText {
        let props = &self.style.citation;
        let format = props.format_citations.then(|| CharacterFormat {
            style_name: props.citation_character_format.clone(),
            italic: props.italic_citations,
            bold: props.bold_citations,
            superscript: props.superscript_citations,
            subscript: props.subscript_citations,
        });
        let et_al = props.et_al_string.trim();
        let italic_range = if props.italic_et_al && !et_al.is_empty() {
            text.find(et_al).map(|start| (start, start + et_al.len()))
        } else {
            None
        };
        CitationText {
            text,
            format,
            italic_range,
        }
    }

    fn author_part(&self, entry: &ResolvedEntry, cap: i64, last_separator: &str) -> String {
        let props = &self.style.citation;
        let Some(raw) = entry.field(&props.author_field) else {
            return String::new();
        };
        let list = AuthorList::parse(&raw);
        let names: Vec<String> = list
            .iter()
            .map(|a| latex::to_unicode(&a.last_name_with_von()))
            .collect();
        let Some(first) = names.first() else {
            return String::new();
        };

        let count = list.len() as i64;
        let mut out = first.clone();
        if count > 1 && !list.and_others && (count <= cap || cap < 0) {
            let (last, middle) = names[1..].split_last().unwrap_or((first, &[]));
            for name in middle {
                out.push_str(&props.author_separator);
                out.push_str(name);
            }
            out.push_str(last_separator);
            out.push_str(last);
        } else if list.and_others || (cap >= 0 && count > cap) {
            out.push_str(&props.et_al_string);
        }
        out
    }

    fn year_part(&self, entry: &ResolvedEntry) -> String {
        entry
            .field(&self.style.citation.year_field)
            .map(|y| latex::to_unicode(&y))
            .unwrap_or_default()
    }
}
