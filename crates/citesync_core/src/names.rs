/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! BibTeX name lists.
//!
//! Name splitting is done by `biblatex::Person`, which handles the three
//! BibTeX forms (`First von Last`, `von Last, First` and
//! `von Last, Jr, First`) and `and`-separated lists. This module adds
//! `and others` and the name renderings the styles ask for.

use biblatex::{Chunk, Chunks, Person, Spanned, Type};
use serde::{Deserialize, Serialize};

/// One person or organization from a name list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first: Option<String>,
    pub von: Option<String>,
    pub last: String,
    pub jr: Option<String>,
}

impl Author {
    /// Surname with its particle, e.g. `von Beta`.
    pub fn last_name_with_von(&self) -> String {
        match &self.von {
            Some(von) => format!("{von} {}", self.last),
            None => self.last.clone(),
        }
    }

    /// `von Last, Jr, First`, omitting absent parts.
    pub fn last_first(&self, abbreviate: bool) -> String {
        let mut out = self.last_name_with_von();
        if let Some(jr) = &self.jr {
            out.push_str(", ");
            out.push_str(jr);
        }
        if let Some(first) = self.given(abbreviate) {
            out.push_str(", ");
            out.push_str(&first);
        }
        out
    }

    /// `First von Last, Jr`, omitting absent parts.
    pub fn first_last(&self, abbreviate: bool) -> String {
        let mut out = String::new();
        if let Some(first) = self.given(abbreviate) {
            out.push_str(&first);
            out.push(' ');
        }
        out.push_str(&self.last_name_with_von());
        if let Some(jr) = &self.jr {
            out.push_str(", ");
            out.push_str(jr);
        }
        out
    }

    fn given(&self, abbreviate: bool) -> Option<String> {
        let first = self.first.as_deref()?;
        if !abbreviate {
            return Some(first.to_string());
        }
        let initials = first
            .split_whitespace()
            .map(|part| {
                part.split('-')
                    .filter_map(|p| p.trim_start_matches('{').chars().next())
                    .map(|c| format!("{c}."))
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .collect::<Vec<_>>()
            .join(" ");
        Some(initials)
    }
}

/// An ordered list of names as parsed from an author or editor field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorList {
    pub authors: Vec<Author>,
    /// Set when the list ends in `and others`.
    #[serde(default)]
    pub and_others: bool,
}

impl From<Person> for Author {
    fn from(person: Person) -> Self {
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        Self {
            first: non_empty(person.given_name),
            von: non_empty(person.prefix),
            last: person.name,
            jr: non_empty(person.suffix),
        }
    }
}

impl AuthorList {
    pub fn parse(input: &str) -> Self {
        let persons = Vec::<Person>::from_chunks(&chunks(input)).unwrap_or_default();
        let mut list = AuthorList::default();
        for person in persons {
            if person.given_name.is_empty() && person.prefix.is_empty() {
                if person.name.is_empty() {
                    continue;
                }
                if person.name.eq_ignore_ascii_case("others") {
                    list.and_others = true;
                    continue;
                }
            }
            list.authors.push(person.into());
        }
        list
    }

    /// Number of names, counting `and others` as one more.
    pub fn len(&self) -> usize {
        self.authors.len() + usize::from(self.and_others)
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Author> {
        self.authors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Author> {
        self.authors.iter()
    }
}

/// Split a stored field value back into biblatex chunks.
///
/// Top-level braced groups become verbatim chunks that keep their braces,
/// so protected words survive into the name parts and are stripped later
/// with the rest of the markup.
fn chunks(input: &str) -> Chunks {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in input.chars() {
        match c {
            '{' => {
                if depth == 0 && !current.is_empty() {
                    out.push(Spanned::detached(Chunk::Normal(std::mem::take(&mut current))));
                }
                depth += 1;
                current.push(c);
            }
            '}' if depth > 0 => {
                depth -= 1;
                current.push(c);
                if depth == 0 {
                    out.push(Spanned::detached(Chunk::Verbatim(std::mem::take(&mut current))));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        let chunk = if depth > 0 {
            Chunk::Verbatim(current)
        } else {
            Chunk::Normal(current)
        };
        out.push(Spanned::detached(chunk));
    }
    out
}
