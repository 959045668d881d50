/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Reference-mark names.
//!
//! A citation is stored in the document as a named mark whose name encodes
//! everything needed to rebuild it:
//!
//! ```text
//! JR_cite<variant>_<type>_<key1>,<key2>,...
//! ```
//!
//! `variant` is an optional decimal disambiguator used when two citations
//! would otherwise share a name, and `type` is one of the
//! [`CitationType`] codes.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use winnow::ascii::digit0;
use winnow::combinator::separated;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::error::MarkNameError;

/// Prefix shared by every citation mark name.
pub const MARK_PREFIX: &str = "JR_cite";

/// Start and end bookmarks of the bibliography section.
pub const BIB_SECTION_NAME: &str = "JR_bib";
pub const BIB_SECTION_END_NAME: &str = "JR_bib_end";

/// How a citation is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum CitationType {
    /// `(Smith, 2005)`
    Parenthetical,
    /// `Smith (2005)`
    InText,
    /// Present in the document, but renders as empty text.
    Invisible,
}

impl CitationType {
    pub fn code(self) -> u8 {
        match self {
            CitationType::Parenthetical => 1,
            CitationType::InText => 2,
            CitationType::Invisible => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(CitationType::Parenthetical),
            2 => Some(CitationType::InText),
            3 => Some(CitationType::Invisible),
            _ => None,
        }
    }
}

/// A decoded citation mark name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkName {
    pub variant: Option<u32>,
    pub kind: CitationType,
    pub keys: Vec<String>,
}

impl MarkName {
    pub fn new(kind: CitationType, keys: Vec<String>) -> Self {
        Self {
            variant: None,
            kind,
            keys,
        }
    }

    /// Decode a mark name.
    pub fn parse(name: &str) -> Result<Self, MarkNameError> {
        let mut input = name;
        mark_name(&mut input)
            .ok()
            .filter(|_| input.is_empty())
            .ok_or_else(|| MarkNameError {
                name: name.to_string(),
            })
    }

    /// The same mark with a different disambiguator.
    pub fn with_variant(&self, variant: Option<u32>) -> Self {
        Self {
            variant,
            ..self.clone()
        }
    }

    /// Find a name not already taken, trying the bare name first and then
    /// variants 0, 1, 2, ...
    pub fn unique(
        kind: CitationType,
        keys: Vec<String>,
        mut is_taken: impl FnMut(&str) -> bool,
    ) -> Self {
        let base = MarkName::new(kind, keys);
        if !is_taken(&base.to_string()) {
            return base;
        }
        (0u32..)
            .map(|i| base.with_variant(Some(i)))
            .find(|candidate| !is_taken(&candidate.to_string()))
            .unwrap_or(base)
    }
}

impl fmt::Display for MarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MARK_PREFIX)?;
        if let Some(variant) = self.variant {
            write!(f, "{variant}")?;
        }
        write!(f, "_{}_{}", self.kind.code(), self.keys.join(","))
    }
}

impl FromStr for MarkName {
    type Err = MarkNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkName::parse(s)
    }
}

fn is_key_char(c: char) -> bool {
    c != ',' && !c.is_whitespace()
}

fn mark_name(input: &mut &str) -> winnow::Result<MarkName, ContextError> {
    MARK_PREFIX.parse_next(input)?;
    let variant: &str = digit0.parse_next(input)?;
    '_'.parse_next(input)?;
    let code: char = one_of(['1', '2', '3']).parse_next(input)?;
    '_'.parse_next(input)?;
    let keys: Vec<&str> = separated(1.., take_while(1.., is_key_char), ',').parse_next(input)?;

    let variant = if variant.is_empty() {
        None
    } else {
        // Over-long digit runs can't be a disambiguator we produced.
        match variant.parse::<u32>() {
            Ok(v) => Some(v),
            Err(_) => return winnow::combinator::fail.parse_next(input),
        }
    };
    let kind = CitationType::from_code(code as u8 - b'0').unwrap_or(CitationType::Parenthetical);

    Ok(MarkName {
        variant,
        kind,
        keys: keys.into_iter().map(String::from).collect(),
    })
}
