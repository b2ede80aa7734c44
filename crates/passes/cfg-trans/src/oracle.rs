//! Decoding of `(trans ...)` oracle literals.
//!
//! An oracle lists the edges a control-flow graph must contain:
//!
//! ```text
//! (trans
//!   (edge (entry) (for.cond))
//!   (edge (for.cond) (for.body)))
//! ```
//!
//! The whole literal is decoded before anything looks at the IR, so a
//! malformed oracle is reported as such and never as a failed check.

use rhizome_arbor_ir::Code;
use rhizome_arbor_sexpr::{self as sexpr, ParseError, Pattern, PatternError, SExpr};
use std::fmt;
use thiserror::Error;

const TRANS: &str = "(trans ?entries...)";
const EDGE: &str = "(edge (?src) (?dest))";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("invalid oracle literal: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid oracle pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("oracle literal is empty")]
    Empty,

    #[error("oracle must have the form (trans (edge (src) (dest))*), got {0}")]
    NotTrans(String),

    /// `index` counts entries from 1, the way arguments are numbered.
    #[error("oracle entry {index} is not of the form (edge (src) (dest)): {entry}")]
    MalformedEntry { index: usize, entry: String },
}

/// One expected control-flow edge, by block name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub src: String,
    pub dest: String,
}

impl Edge {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }

    pub fn to_sexpr(&self) -> SExpr {
        SExpr::call(
            "edge",
            vec![
                SExpr::list(vec![SExpr::atom(self.src.as_str())]),
                SExpr::list(vec![SExpr::atom(self.dest.as_str())]),
            ],
        )
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dest)
    }
}

/// A decoded oracle: the edges to check, in literal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedCfg {
    edges: Vec<Edge>,
}

impl ExpectedCfg {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Parses and decodes an oracle literal.
    pub fn parse(text: &str) -> Result<Self, OracleError> {
        let value = sexpr::parse(text)?.ok_or(OracleError::Empty)?;
        Self::from_sexpr(&value)
    }

    /// Like [`ExpectedCfg::parse`], for literals whose atoms carry a sigil
    /// such as `($trans ($edge ($a) ($b)))`.
    pub fn parse_with_sigil(text: &str, sigil: char) -> Result<Self, OracleError> {
        let value = sexpr::parse_with_sigil(text, sigil)?.ok_or(OracleError::Empty)?;
        Self::from_sexpr(&value)
    }

    pub fn from_sexpr(value: &SExpr) -> Result<Self, OracleError> {
        let trans = Pattern::parse(TRANS)?;
        let edge = Pattern::parse(EDGE)?;

        let bindings = trans
            .matches(value)
            .ok_or_else(|| OracleError::NotTrans(value.to_string()))?;
        let entries = bindings.rest("entries").unwrap_or_default();

        let mut edges = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let malformed = || OracleError::MalformedEntry {
                index: i + 1,
                entry: entry.to_string(),
            };
            let found = edge.matches(entry).ok_or_else(malformed)?;
            match (found.atom("src"), found.atom("dest")) {
                (Some(src), Some(dest)) => edges.push(Edge::new(src, dest)),
                _ => return Err(malformed()),
            }
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn to_sexpr(&self) -> SExpr {
        SExpr::call("trans", self.edges.iter().map(Edge::to_sexpr).collect())
    }
}

/// Renders the edges of `code` as an oracle literal, sorted by block name.
///
/// Useful for writing a new oracle from a graph known to be correct.
pub fn capture_trans(code: &Code) -> SExpr {
    let mut edges: Vec<Edge> = code
        .edges()
        .filter_map(|(from, to)| {
            Some(Edge::new(code.block(from)?.name(), code.block(to)?.name()))
        })
        .collect();
    edges.sort();
    ExpectedCfg::new(edges).to_sexpr()
}
