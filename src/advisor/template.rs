//! Named-placeholder format strings.
//!
//! Syntax: `{name}` is a placeholder, `{{` and `}}` are literal braces.
//! Names are identifiers (`[A-Za-z_][A-Za-z0-9_]*`). Strings are parsed once
//! when the template store loads, so rendering never meets a syntax error.
//! Rendering first checks that every referenced name has a value, then
//! substitutes; a missing name fails the whole render.

use std::collections::HashMap;

use thiserror::Error;

use super::error::AdvisorError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),
    #[error("unmatched '}}' at byte {0}")]
    Unmatched(usize),
    #[error("empty placeholder at byte {0}")]
    Empty(usize),
    #[error("invalid placeholder name '{name}' at byte {at}")]
    InvalidName { name: String, at: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatString {
    segments: Vec<Segment>,
}

impl FormatString {
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(FormatError::Unclosed(at));
                    }
                    if name.is_empty() {
                        return Err(FormatError::Empty(at));
                    }
                    if !is_identifier(&name) {
                        return Err(FormatError::InvalidName { name, at });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return Err(FormatError::Unmatched(at)),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Distinct placeholder names in first-appearance order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Placeholder(name) = seg {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn references(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|seg| matches!(seg, Segment::Placeholder(n) if n == name))
    }

    /// Substitute every placeholder from `vars`. Unused entries are ignored.
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String, AdvisorError> {
        if let Some(missing) = self.placeholders().into_iter().find(|n| !vars.contains_key(*n)) {
            return Err(AdvisorError::MissingPlaceholder(missing.to_string()));
        }

        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                // Presence checked above.
                Segment::Placeholder(name) => out.push_str(&vars[name]),
            }
        }
        Ok(out)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
