//! CSS-style selectors.
//!
//! Supports what the field rules need: type and universal selectors, `#id`,
//! `.class`, attribute tests (`[a]`, `[a=v]`, `[a^=v]`, `[a*=v]`, `[a$=v]`),
//! the descendant combinator and comma-separated lists.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected '{found}' at offset {offset} in selector '{selector}'")]
    Unexpected {
        found: char,
        offset: usize,
        selector: String,
    },

    #[error("unexpected end of selector '{0}'")]
    UnexpectedEnd(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Contains,
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrTest {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
        }
    }
}

/// One compound selector such as `input.big[type="text"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, doc: &dyn Document, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if doc.tag(node).as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = doc.attribute(node, "class").unwrap_or_default();
            let present: Vec<&str> = class.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|test| test.matches(doc.attribute(node, &test.name).as_deref()))
    }
}

/// Compounds joined by descendant combinators; the last is the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
}

impl Complex {
    fn matches(&self, doc: &dyn Document, node: NodeId) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(doc, node) {
            return false;
        }

        // Descendant-only chains can be matched greedily on the nearest
        // qualifying ancestor.
        let mut current = doc.parent(node);
        for compound in ancestors.iter().rev() {
            loop {
                match current {
                    Some(n) if compound.matches(doc, n) => {
                        current = doc.parent(n);
                        break;
                    }
                    Some(n) => current = doc.parent(n),
                    None => return false,
                }
            }
        }
        true
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Parser::new(source).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &dyn Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }

    /// Matching descendants of `scope` (excluding `scope`), in document order.
    pub fn query_all(&self, doc: &dyn Document, scope: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = doc.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.matches(doc, node) {
                found.push(node);
            }
            stack.extend(doc.children(node).into_iter().rev());
        }
        found
    }

    /// Whether `scope` or any of its descendants matches.
    pub fn matches_within(&self, doc: &dyn Document, scope: NodeId) -> bool {
        let mut stack = vec![scope];
        while let Some(node) = stack.pop() {
            if self.matches(doc, node) {
                return true;
            }
            stack.extend(doc.children(node));
        }
        false
    }

    /// `node` itself or its nearest matching ancestor.
    pub fn closest(&self, doc: &dyn Document, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.matches(doc, n) {
                return Some(n);
            }
            current = doc.parent(n);
        }
        None
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(c) => return Err(self.unexpected(c)),
            }
        }
        Ok(Selector {
            source: self.source.trim().to_string(),
            alternatives,
        })
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut compounds = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(',') if compounds.is_empty() => {
                    return Err(match self.peek() {
                        Some(c) => self.unexpected(c),
                        None => SelectorError::Empty,
                    });
                }
                None | Some(',') => break,
                Some(_) => compounds.push(self.compound()?),
            }
        }
        Ok(Complex { compounds })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut any = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                any = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                any = true;
            }
            _ => {}
        }

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                '.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                '[' => {
                    self.pos += 1;
                    compound.attributes.push(self.attribute()?);
                }
                c if c.is_whitespace() || c == ',' => break,
                c => return Err(self.unexpected(c)),
            }
            any = true;
        }

        if !any {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(self.end()),
            };
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let op = match self.next().ok_or_else(|| self.end())? {
            ']' => {
                return Ok(AttrTest {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            '=' => AttrOp::Equals,
            c @ ('^' | '*' | '$') => {
                match self.next() {
                    Some('=') => {}
                    Some(other) => return Err(self.unexpected_at(other, self.pos - 1)),
                    None => return Err(self.end()),
                }
                match c {
                    '^' => AttrOp::Prefix,
                    '*' => AttrOp::Contains,
                    _ => AttrOp::Suffix,
                }
            }
            other => return Err(self.unexpected_at(other, self.pos - 1)),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.next() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(self.end()),
                    }
                }
                value
            }
            _ => self.ident()?,
        };

        self.skip_whitespace();
        match self.next() {
            Some(']') => Ok(AttrTest { name, op, value }),
            Some(other) => Err(self.unexpected_at(other, self.pos - 1)),
            None => Err(self.end()),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(self.end()),
            };
        }
        Ok(self.chars[start..self.pos].iter().map(|(_, c)| c).collect())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn unexpected(&self, found: char) -> SelectorError {
        self.unexpected_at(found, self.pos)
    }

    fn unexpected_at(&self, found: char, pos: usize) -> SelectorError {
        SelectorError::Unexpected {
            found,
            offset: self.chars.get(pos).map(|(i, _)| *i).unwrap_or(self.source.len()),
            selector: self.source.to_string(),
        }
    }

    fn end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd(self.source.to_string())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
