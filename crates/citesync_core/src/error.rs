/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

use thiserror::Error;

/// Errors raised while loading or validating a citation style.
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("style has no {0}")]
    MissingProperty(String),

    #[error("invalid value {value:?} for property {name}: expected {expected}")]
    InvalidProperty {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("style file contains no recognized section")]
    NoSections,

    #[error("invalid layout for entry type '{entry_type}': {message}")]
    InvalidLayout { entry_type: String, message: String },

    #[error("failed to parse {0} style: {1}")]
    ParseError(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A reference-mark name that does not follow the citation naming scheme.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a citation mark name: {name}")]
pub struct MarkNameError {
    pub name: String,
}

/// Errors raised while reading bibliographic data.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("failed to parse {0} database: {1}")]
    ParseError(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
