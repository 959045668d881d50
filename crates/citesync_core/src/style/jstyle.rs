/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Reader for the line-oriented `.jstyle` format.
//!
//! ```text
//! NAME
//! Example author-year style
//!
//! PROPERTIES
//! Title="References"
//! IsSortByPosition=false
//!
//! CITATION
//! MaxAuthors=3
//! AuthorSeparator=", "
//!
//! LAYOUT
//! article=\format[AuthorLastFirst]{\author} (\year). <i>\title</i>.
//! default=\author (\year). \title.
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::{PropertyValue, RawStyle};
use crate::error::StyleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Name,
    Journals,
    Properties,
    Citation,
    Layout,
}

fn quoted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^".*"$"#).expect("valid regex"))
}

fn integer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("valid regex"))
}

/// Parse `.jstyle` source into its raw sections.
pub fn parse(src: &str) -> Result<RawStyle, StyleError> {
    let mut raw = RawStyle::default();
    let mut section = Section::None;
    let mut seen_section = false;

    for line in src.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let next = match line.trim() {
            "NAME" => Some(Section::Name),
            "JOURNALS" => Some(Section::Journals),
            "PROPERTIES" => Some(Section::Properties),
            "CITATION" => Some(Section::Citation),
            "LAYOUT" => Some(Section::Layout),
            _ => None,
        };
        if let Some(next) = next {
            section = next;
            seen_section = true;
            continue;
        }

        match section {
            Section::None => {
                tracing::debug!(line, "ignoring line outside any section");
            }
            Section::Name => raw.name = Some(line.trim().to_string()),
            Section::Journals => raw.journals.push(line.trim().to_string()),
            Section::Properties => {
                if let Some((name, value)) = property_line(line) {
                    raw.properties.insert(name, value);
                }
            }
            Section::Citation => {
                if let Some((name, value)) = property_line(line) {
                    raw.citation.insert(name, value);
                }
            }
            Section::Layout => {
                // `type=template`, with a non-empty type and template
                match line.find('=') {
                    Some(index) if index > 0 && index < line.len() - 1 => {
                        let entry_type = line[..index].trim().to_lowercase();
                        raw.layout.insert(entry_type, line[index + 1..].to_string());
                    }
                    _ => tracing::debug!(line, "ignoring malformed layout line"),
                }
            }
        }
    }

    if !seen_section {
        return Err(StyleError::NoSections);
    }
    Ok(raw)
}

/// Split `Name=value` and type the value.
///
/// A value wrapped in double quotes is taken literally (minus the quotes),
/// so `", "` keeps its space. Otherwise integers and `true`/`false` are
/// recognized and anything else is a string.
fn property_line(line: &str) -> Option<(String, PropertyValue)> {
    let index = line.find('=').filter(|i| *i > 0)?;
    let name = line[..index].trim().to_string();
    let value = &line[index + 1..];

    let trimmed = value.trim();
    if trimmed.len() >= 2 && quoted().is_match(trimmed) {
        let inner = &trimmed[1..trimmed.len() - 1];
        return Some((name, PropertyValue::Str(inner.to_string())));
    }
    let typed = if integer().is_match(trimmed) {
        trimmed
            .parse::<i64>()
            .map(PropertyValue::Int)
            .unwrap_or_else(|_| PropertyValue::Str(value.to_string()))
    } else if trimmed.eq_ignore_ascii_case("true") {
        PropertyValue::Bool(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        PropertyValue::Bool(false)
    } else {
        PropertyValue::Str(value.to_string())
    };
    Some((name, typed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# comment\r\nNAME\r\nSample style\r\n\r\nJOURNALS\nJournal of Tests\n\nPROPERTIES\nTitle=\"References\"\nIsSortByPosition=false\nIsNumberEntries=TRUE\n\nCITATION\nMaxAuthors=3\nMaxAuthorsFirst=-1\nAuthorSeparator=\", \"\nEtAlString= et al.\nBracketBefore=[\n\nLAYOUT\narticle=\\author (\\year)\nDefault=\\author. \\title\nbroken=\n";

    #[test]
    fn test_sections() {
        let raw = parse(SAMPLE).unwrap();
        assert_eq!(raw.name.as_deref(), Some("Sample style"));
        assert_eq!(raw.journals, vec!["Journal of Tests"]);
        assert_eq!(raw.layout.get("article").map(String::as_str), Some("\\author (\\year)"));
        assert_eq!(raw.layout.get("default").map(String::as_str), Some("\\author. \\title"));
        assert!(!raw.layout.contains_key("broken"));
    }

    #[test]
    fn test_property_typing() {
        let raw = parse(SAMPLE).unwrap();
        assert_eq!(raw.properties["Title"], PropertyValue::Str("References".into()));
        assert_eq!(raw.properties["IsSortByPosition"], PropertyValue::Bool(false));
        assert_eq!(raw.properties["IsNumberEntries"], PropertyValue::Bool(true));
        assert_eq!(raw.citation["MaxAuthors"], PropertyValue::Int(3));
        assert_eq!(raw.citation["MaxAuthorsFirst"], PropertyValue::Int(-1));
        assert_eq!(raw.citation["AuthorSeparator"], PropertyValue::Str(", ".into()));
        assert_eq!(raw.citation["EtAlString"], PropertyValue::Str(" et al.".into()));
        assert_eq!(raw.citation["BracketBefore"], PropertyValue::Str("[".into()));
    }

    #[test]
    fn test_no_sections() {
        assert!(matches!(parse("just some text\n"), Err(StyleError::NoSections)));
        assert!(matches!(parse(""), Err(StyleError::NoSections)));
    }
}
