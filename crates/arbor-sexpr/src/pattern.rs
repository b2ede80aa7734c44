//! Structural pattern matching over S-expressions.
//!
//! A pattern has the same shape as a value, except that atom positions are
//! either literals (must match exactly) or named captures (match anything
//! and bind it). A list pattern may end in a rest capture, which binds every
//! remaining element as a slice.
//!
//! Text form: `?name` is a capture, `?name...` a rest capture and every
//! other atom is a literal.
//!
//! ```
//! use rhizome_arbor_sexpr::{Pattern, SExpr};
//!
//! let edge = Pattern::parse("(edge (?src) (?dest))").unwrap();
//! let value: SExpr = "(edge (entry) (exit))".parse().unwrap();
//!
//! let bindings = edge.matches(&value).unwrap();
//! assert_eq!(bindings.atom("src"), Some("entry"));
//! assert_eq!(bindings.atom("dest"), Some("exit"));
//!
//! let other: SExpr = "(edge (entry) exit)".parse().unwrap();
//! assert!(edge.matches(&other).is_none());
//! ```

use crate::reader::{self, ParseError};
use crate::SExpr;
use thiserror::Error;

/// Errors raised while building a pattern. Matching itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("capture '{0}' appears more than once")]
    DuplicateCapture(String),

    #[error("rest capture '{0}' must be the last element of its list")]
    RestNotLast(String),

    #[error("rest capture '{0}' can only appear inside a list")]
    RestOutsideList(String),

    #[error("capture name is empty")]
    EmptyCaptureName,

    #[error("pattern text is empty")]
    Empty,

    #[error("invalid pattern text: {0}")]
    Parse(#[from] ParseError),
}

// Private inner tree - patterns are only built through validating constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(String),
    Capture(String),
    List { items: Vec<Node>, rest: Option<String> },
}

/// A validated pattern template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    root: Node,
    captures: Vec<String>,
}

impl Pattern {
    /// Matches only an atom with exactly this text.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            root: Node::Literal(text.into()),
            captures: Vec::new(),
        }
    }

    /// Matches any value and binds it under `name`.
    pub fn capture(name: impl Into<String>) -> Result<Self, PatternError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PatternError::EmptyCaptureName);
        }
        Ok(Self {
            root: Node::Capture(name.clone()),
            captures: vec![name],
        })
    }

    /// Matches a list of exactly `items.len()` elements, positionally.
    pub fn list(items: Vec<Pattern>) -> Result<Self, PatternError> {
        let mut captures: Vec<String> = Vec::new();
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            for name in item.captures {
                push_capture(&mut captures, name)?;
            }
            nodes.push(item.root);
        }
        Ok(Self {
            root: Node::List {
                items: nodes,
                rest: None,
            },
            captures,
        })
    }

    /// Matches `(tag arg1 .. argN)`: a list headed by the atom `tag` with
    /// exactly N further elements.
    pub fn call(tag: impl Into<String>, args: Vec<Pattern>) -> Result<Self, PatternError> {
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(Pattern::literal(tag));
        items.extend(args);
        Self::list(items)
    }

    /// Lets a list pattern accept any number of further elements, bound as a
    /// slice under `name`.
    pub fn with_rest(mut self, name: impl Into<String>) -> Result<Self, PatternError> {
        let name = name.into();
        match &mut self.root {
            Node::List { rest, .. } => {
                push_capture(&mut self.captures, name.clone())?;
                *rest = Some(name);
                Ok(self)
            }
            _ => Err(PatternError::RestOutsideList(name)),
        }
    }

    /// Parses the text form of a pattern.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let value = reader::parse(text)?.ok_or(PatternError::Empty)?;
        Self::from_template(&value)
    }

    /// Builds a pattern from an already parsed template value.
    pub fn from_template(template: &SExpr) -> Result<Self, PatternError> {
        match template {
            SExpr::Atom(text) => match classify(text)? {
                Slot::Literal => Ok(Pattern::literal(text.as_str())),
                Slot::Capture(name) => Pattern::capture(name),
                Slot::Rest(name) => Err(PatternError::RestOutsideList(name.to_string())),
            },
            SExpr::List(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                let mut rest = None;
                for (i, element) in elements.iter().enumerate() {
                    if let SExpr::Atom(text) = element {
                        if let Slot::Rest(name) = classify(text)? {
                            if i + 1 != elements.len() {
                                return Err(PatternError::RestNotLast(name.to_string()));
                            }
                            rest = Some(name);
                            continue;
                        }
                    }
                    items.push(Self::from_template(element)?);
                }
                let pattern = Self::list(items)?;
                match rest {
                    Some(name) => pattern.with_rest(name),
                    None => Ok(pattern),
                }
            }
        }
    }

    /// Capture names in order of appearance.
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    /// Matches `value`, returning the bindings on success.
    ///
    /// `None` means "no match"; it is an ordinary outcome, not an error.
    pub fn matches<'a>(&self, value: &'a SExpr) -> Option<Bindings<'a>> {
        let mut entries = Vec::with_capacity(self.captures.len());
        if match_node(&self.root, value, &mut entries) {
            Some(Bindings { entries })
        } else {
            None
        }
    }

    /// Returns true if `value` matches.
    pub fn is_match(&self, value: &SExpr) -> bool {
        self.matches(value).is_some()
    }
}

enum Slot<'a> {
    Literal,
    Capture(&'a str),
    Rest(&'a str),
}

fn classify(text: &str) -> Result<Slot<'_>, PatternError> {
    let Some(name) = text.strip_prefix('?') else {
        return Ok(Slot::Literal);
    };
    let (slot, name) = match name.strip_suffix("...") {
        Some(name) => (Slot::Rest(name), name),
        None => (Slot::Capture(name), name),
    };
    if name.is_empty() {
        return Err(PatternError::EmptyCaptureName);
    }
    Ok(slot)
}

fn push_capture(captures: &mut Vec<String>, name: String) -> Result<(), PatternError> {
    if name.is_empty() {
        return Err(PatternError::EmptyCaptureName);
    }
    if captures.contains(&name) {
        return Err(PatternError::DuplicateCapture(name));
    }
    captures.push(name);
    Ok(())
}

fn match_node<'a>(node: &Node, value: &'a SExpr, out: &mut Vec<(String, Binding<'a>)>) -> bool {
    match node {
        Node::Literal(text) => value.as_atom() == Some(text.as_str()),
        Node::Capture(name) => {
            out.push((name.clone(), Binding::One(value)));
            true
        }
        Node::List { items, rest } => {
            let Some(elements) = value.as_list() else {
                return false;
            };
            let arity_ok = match rest {
                Some(_) => elements.len() >= items.len(),
                None => elements.len() == items.len(),
            };
            if !arity_ok {
                return false;
            }
            for (item, element) in items.iter().zip(elements) {
                if !match_node(item, element, out) {
                    return false;
                }
            }
            if let Some(name) = rest {
                out.push((name.clone(), Binding::Rest(&elements[items.len()..])));
            }
            true
        }
    }
}

/// A value bound by a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding<'a> {
    One(&'a SExpr),
    Rest(&'a [SExpr]),
}

impl<'a> Binding<'a> {
    /// The bound value, for a single capture.
    pub fn value(&self) -> Option<&'a SExpr> {
        match *self {
            Binding::One(value) => Some(value),
            Binding::Rest(_) => None,
        }
    }

    /// The bound values; a single capture yields a one-element slice.
    pub fn values(&self) -> &'a [SExpr] {
        match *self {
            Binding::One(value) => std::slice::from_ref(value),
            Binding::Rest(values) => values,
        }
    }
}

/// Captures produced by a successful match, in pattern order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings<'a> {
    entries: Vec<(String, Binding<'a>)>,
}

impl<'a> Bindings<'a> {
    pub fn get(&self, name: &str) -> Option<Binding<'a>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, binding)| *binding)
    }

    /// The value bound by the single capture `name`.
    pub fn one(&self, name: &str) -> Option<&'a SExpr> {
        self.get(name)?.value()
    }

    /// The text bound by `name`, if it captured an atom.
    pub fn atom(&self, name: &str) -> Option<&'a str> {
        self.one(name)?.as_atom()
    }

    /// The elements bound by the rest capture `name`.
    pub fn rest(&self, name: &str) -> Option<&'a [SExpr]> {
        match self.get(name)? {
            Binding::Rest(values) => Some(values),
            Binding::One(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Binding<'a>)> + '_ {
        self.entries.iter().map(|(name, binding)| (name.as_str(), *binding))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
