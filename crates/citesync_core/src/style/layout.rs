/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Bibliography entry templates.
//!
//! A layout is literal text interleaved with field references:
//!
//! - `\author` inserts a field value,
//! - `\begin{volume} vol. \volume\end{volume}` renders its body only when the
//!   named field is present,
//! - `\format[AuthorLastFirst,AuthorAndsReplacer]{\author}` renders its body
//!   and passes the result through the listed formatters.
//!
//! Everything else, inline `<b>`/`<i>` markup included, is copied through.

use winnow::combinator::{fail, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{any, take_until, take_while};

use crate::error::StyleError;
use crate::latex;
use crate::names::AuthorList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    Text(String),
    Field(String),
    /// Rendered only when `field` has a non-empty value.
    Group {
        field: String,
        body: Vec<LayoutNode>,
    },
    Format {
        formatters: Vec<String>,
        body: Vec<LayoutNode>,
    },
}

/// A parsed entry template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source: String,
    pub nodes: Vec<LayoutNode>,
}

impl Layout {
    pub fn parse(entry_type: &str, source: &str) -> Result<Self, StyleError> {
        let invalid = |message: String| StyleError::InvalidLayout {
            entry_type: entry_type.to_string(),
            message,
        };
        let mut input = source;
        let nodes = nodes(&mut input, false).map_err(|e| invalid(e.to_string()))?;
        if !input.is_empty() {
            return Err(invalid(format!("unexpected input at '{input}'")));
        }
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// Render against a field lookup.
    ///
    /// The lookup returns raw field values; LaTeX markup is converted once,
    /// after formatters have run.
    pub fn render(&self, lookup: &dyn Fn(&str) -> Option<String>) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, lookup, &mut out);
        latex::to_unicode(&out)
    }
}

fn render_nodes(nodes: &[LayoutNode], lookup: &dyn Fn(&str) -> Option<String>, out: &mut String) {
    for node in nodes {
        match node {
            LayoutNode::Text(text) => out.push_str(text),
            LayoutNode::Field(name) => {
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
            }
            LayoutNode::Group { field, body } => {
                if lookup(field).is_some_and(|v| !v.trim().is_empty()) {
                    render_nodes(body, lookup, out);
                }
            }
            LayoutNode::Format { formatters, body } => {
                let mut inner = String::new();
                render_nodes(body, lookup, &mut inner);
                let formatted = formatters
                    .iter()
                    .fold(inner, |value, name| apply_formatter(name, &value));
                out.push_str(&formatted);
            }
        }
    }
}

/// Apply a named formatter. Unknown names leave the value unchanged.
pub fn apply_formatter(name: &str, value: &str) -> String {
    match name {
        "AuthorLastFirst" => format_names(value, |a| a.last_first(false)),
        "AuthorLastFirstAbbreviator" => format_names(value, |a| a.last_first(true)),
        "AuthorFirstLast" => format_names(value, |a| a.first_last(false)),
        "AuthorAndsReplacer" => replace_ands(value),
        "FormatPages" => format_pages(value),
        "RemoveBrackets" => value.chars().filter(|c| *c != '{' && *c != '}').collect(),
        "ToUpperCase" => value.to_uppercase(),
        "ToLowerCase" => value.to_lowercase(),
        other => {
            tracing::warn!(formatter = other, "unknown layout formatter, leaving value unchanged");
            value.to_string()
        }
    }
}

fn format_names(value: &str, render: impl Fn(&crate::names::Author) -> String) -> String {
    let list = AuthorList::parse(value);
    let mut names: Vec<String> = list.iter().map(render).collect();
    if list.and_others {
        names.push("others".to_string());
    }
    names.join(" and ")
}

/// `A and B and C` becomes `A; B & C`.
fn replace_ands(value: &str) -> String {
    let names: Vec<&str> = value.split(" and ").collect();
    match names.as_slice() {
        [] => String::new(),
        [single] => single.to_string(),
        [init @ .., last] => format!("{} & {last}", init.join("; ")),
    }
}

/// Collapse runs of hyphens in page ranges to a single hyphen.
fn format_pages(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_dash = false;
    for c in value.chars() {
        if c == '-' {
            if !previous_dash {
                out.push('-');
            }
            previous_dash = true;
        } else {
            out.push(c);
            previous_dash = false;
        }
    }
    out
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn nodes(input: &mut &str, in_braces: bool) -> winnow::Result<Vec<LayoutNode>, ContextError> {
    let mut out = Vec::new();
    loop {
        if input.is_empty() || input.starts_with("\\end{") || (in_braces && input.starts_with('}')) {
            return Ok(out);
        }
        let node = if input.starts_with("\\begin{") {
            group(input)?
        } else if input.starts_with("\\format") {
            format_call(input)?
        } else if input.starts_with('\\') {
            field_ref(input)?
        } else {
            text(input, in_braces)?
        };
        out.push(node);
    }
}

fn text(input: &mut &str, in_braces: bool) -> winnow::Result<LayoutNode, ContextError> {
    let text: &str =
        take_while(1.., |c: char| c != '\\' && !(in_braces && c == '}')).parse_next(input)?;
    Ok(LayoutNode::Text(text.to_string()))
}

fn field_ref(input: &mut &str) -> winnow::Result<LayoutNode, ContextError> {
    '\\'.parse_next(input)?;
    let name: Option<&str> = opt(take_while(1.., is_name_char)).parse_next(input)?;
    match name {
        Some(name) => Ok(LayoutNode::Field(name.to_string())),
        // An escaped character such as `\,` stands for itself.
        None => {
            let c: char = any.parse_next(input)?;
            Ok(LayoutNode::Text(c.to_string()))
        }
    }
}

fn group(input: &mut &str) -> winnow::Result<LayoutNode, ContextError> {
    "\\begin{".parse_next(input)?;
    let field: &str = take_while(1.., is_name_char).parse_next(input)?;
    '}'.parse_next(input)?;
    let body = nodes(input, false)?;
    "\\end{".parse_next(input)?;
    let end: &str = take_while(1.., is_name_char).parse_next(input)?;
    '}'.parse_next(input)?;
    if end != field {
        return fail.parse_next(input);
    }
    Ok(LayoutNode::Group {
        field: field.to_string(),
        body,
    })
}

fn format_call(input: &mut &str) -> winnow::Result<LayoutNode, ContextError> {
    "\\format".parse_next(input)?;
    let formatters = match opt('[').parse_next(input)? {
        Some(_) => {
            let list: &str = take_until(0.., ']').parse_next(input)?;
            ']'.parse_next(input)?;
            list.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect()
        }
        None => Vec::new(),
    };
    '{'.parse_next(input)?;
    let body = nodes(input, true)?;
    '}'.parse_next(input)?;
    Ok(LayoutNode::Format { formatters, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn fields() -> IndexMap<&'static str, &'static str> {
        IndexMap::from([
            ("author", "Beta, Alpha and Epsilon, Gamma and von Zeta, Eta"),
            ("year", "2000"),
            ("title", "Fr{\\'e}quence"),
            ("pages", "11--18"),
        ])
    }

    fn render(source: &str) -> String {
        let fields = fields();
        let layout = Layout::parse("article", source).unwrap();
        layout.render(&|name: &str| fields.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(render("\\year. <i>\\title</i>"), "2000. <i>Fréquence</i>");
    }

    #[test]
    fn test_conditional_group() {
        assert_eq!(render("\\year\\begin{volume}, vol. \\volume\\end{volume}."), "2000.");
        assert_eq!(render("\\year\\begin{pages}, pp. \\pages\\end{pages}"), "2000, pp. 11\u{2013}18");
    }

    #[test]
    fn test_formatter_chain() {
        assert_eq!(
            render("\\format[AuthorLastFirst,AuthorAndsReplacer]{\\author}"),
            "Beta, Alpha; Epsilon, Gamma & von Zeta, Eta"
        );
        assert_eq!(
            render("\\format[AuthorLastFirstAbbreviator]{\\author}"),
            "Beta, A. and Epsilon, G. and von Zeta, E."
        );
        assert_eq!(render("pp. \\format[FormatPages]{\\pages}"), "pp. 11-18");
    }

    #[test]
    fn test_unknown_formatter_is_identity() {
        assert_eq!(render("\\format[NoSuchThing]{\\year}"), "2000");
    }

    #[test]
    fn test_missing_field_renders_empty() {
        assert_eq!(render("[\\volume]"), "[]");
    }

    #[test]
    fn test_mismatched_group_is_an_error() {
        let err = Layout::parse("book", "\\begin{a}x\\end{b}").unwrap_err();
        assert!(matches!(err, StyleError::InvalidLayout { entry_type, .. } if entry_type == "book"));
        assert!(Layout::parse("book", "x\\end{a}").is_err());
    }
}
