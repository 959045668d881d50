/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Bibliographic entries and the databases that hold them.

use biblatex::{Bibliography, Chunk};
use indexmap::IndexMap;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::BibError;

/// Crossref chains longer than this are treated as cycles.
const MAX_CROSSREF_DEPTH: usize = 8;

/// A single bibliographic record.
///
/// Field names are stored lowercased; values are kept as written in the
/// source, LaTeX markup included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub struct BibEntry {
    /// The citation key.
    pub key: String,
    /// The entry type, e.g. `article` or `book`.
    #[serde(default)]
    pub entry_type: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl BibEntry {
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into().to_lowercase(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    /// The raw value of a field on this entry alone, ignoring crossrefs.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Convert a parsed biblatex entry.
    ///
    /// Verbatim chunks come from braced groups in the source and are
    /// re-wrapped in braces, so a corporate author like
    /// `{JabRef Development Team}` still reads as a single name.
    pub fn from_biblatex(entry: &biblatex::Entry) -> Self {
        let mut result = Self::new(entry.key.clone(), entry.entry_type.to_string());
        for (name, chunks) in &entry.fields {
            let value = chunks
                .iter()
                .map(|c| match &c.v {
                    Chunk::Normal(s) => s.clone(),
                    Chunk::Verbatim(s) => format!("{{{s}}}"),
                    _ => String::new(),
                })
                .collect::<String>();
            result.set_field(name, value);
        }
        result
    }
}

/// Read access to a collection of entries.
///
/// Implementors only need `name` and `entry`; field resolution with
/// crossref following and fallback chains comes for free.
pub trait BibliographicDatabase {
    /// A human-readable name, used in log output.
    fn name(&self) -> &str;

    /// Look up an entry by citation key.
    fn entry(&self, key: &str) -> Option<&BibEntry>;

    /// The value of `field` on `entry`, following `crossref` to a parent
    /// entry in this database when the field is absent or blank.
    fn resolved_field(&self, entry: &BibEntry, field: &str) -> Option<String> {
        let mut current = entry;
        for _ in 0..MAX_CROSSREF_DEPTH {
            if let Some(value) = current.field(field).filter(|v| !v.trim().is_empty()) {
                return Some(value.to_string());
            }
            let parent = current
                .field("crossref")
                .map(str::trim)
                .and_then(|key| self.entry(key))?;
            current = parent;
        }
        None
    }

    /// Resolve a `/`-separated fallback chain such as `author/editor`.
    ///
    /// The first field that yields a non-blank value wins.
    fn resolved_field_chain(&self, entry: &BibEntry, chain: &str) -> Option<String> {
        chain
            .split('/')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .find_map(|f| self.resolved_field(entry, f))
    }
}

/// An in-memory database keyed by citation key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct BibDatabase {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entries: IndexMap<String, BibEntry>,
}

impl BibDatabase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Parse BibTeX or BibLaTeX source text.
    pub fn from_bibtex(name: impl Into<String>, src: &str) -> Result<Self, BibError> {
        let bibliography = Bibliography::parse(src)
            .map_err(|e| BibError::ParseError("BibTeX".to_string(), e.to_string()))?;
        let mut db = Self::new(name);
        for entry in bibliography.iter() {
            db.insert(BibEntry::from_biblatex(entry));
        }
        tracing::debug!(database = %db.name, entries = db.entries.len(), "loaded BibTeX database");
        Ok(db)
    }

    /// Add an entry, replacing any existing entry with the same key.
    pub fn insert(&mut self, entry: BibEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub fn with_entry(mut self, entry: BibEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BibliographicDatabase for BibDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> BibDatabase {
        BibDatabase::new("test")
            .with_entry(
                BibEntry::new("Parent2010", "book")
                    .with_field("editor", "Doe, Jane")
                    .with_field("year", "2010")
                    .with_field("publisher", "Acme"),
            )
            .with_entry(
                BibEntry::new("Child2010", "incollection")
                    .with_field("title", "A Chapter")
                    .with_field("author", "  ")
                    .with_field("crossref", "Parent2010"),
            )
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        let entry = BibEntry::new("k", "Article").with_field("YEAR", "2001");
        assert_eq!(entry.field("year"), Some("2001"));
        assert_eq!(entry.field("Year"), Some("2001"));
        assert_eq!(entry.entry_type, "article");
    }

    #[test]
    fn test_resolved_field_follows_crossref() {
        let db = db();
        let child = db.entry("Child2010").unwrap();
        assert_eq!(db.resolved_field(child, "year").as_deref(), Some("2010"));
        assert_eq!(db.resolved_field(child, "title").as_deref(), Some("A Chapter"));
        assert_eq!(db.resolved_field(child, "volume"), None);
    }

    #[test]
    fn test_field_chain_skips_blank_values() {
        let db = db();
        let child = db.entry("Child2010").unwrap();
        assert_eq!(
            db.resolved_field_chain(child, "author/editor").as_deref(),
            Some("Doe, Jane")
        );
    }

    #[test]
    fn test_crossref_cycle_terminates() {
        let db = BibDatabase::new("loop")
            .with_entry(BibEntry::new("a", "misc").with_field("crossref", "b"))
            .with_entry(BibEntry::new("b", "misc").with_field("crossref", "a"));
        let a = db.entry("a").unwrap();
        assert_eq!(db.resolved_field(a, "year"), None);
    }

    #[test]
    fn test_from_bibtex() {
        let src = r#"
@article{Smith2005,
  author = {Smith, John and {JabRef Development Team}},
  title = {On Things},
  year = {2005},
}
@book{Jones2010,
  author = {Jones, Ann},
  year = 2010,
}
"#;
        let db = BibDatabase::from_bibtex("sample", src).unwrap();
        assert_eq!(db.len(), 2);
        let smith = db.entry("Smith2005").unwrap();
        assert_eq!(smith.entry_type, "article");
        assert_eq!(smith.field("year"), Some("2005"));
        assert!(smith.field("author").unwrap().contains("JabRef Development Team"));
        assert_eq!(db.entry("Jones2010").unwrap().field("year"), Some("2010"));
    }
}
