//! S-expression values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed S-expression: an opaque atom or an ordered list of values.
///
/// Atoms carry no type information; `42`, `entry` and `*in_for.body_phi` are
/// all plain text. A list whose first element is an atom is a *call*: the
/// atom is its tag and the remaining elements are its arguments.
///
/// ```
/// use rhizome_arbor_sexpr::SExpr;
///
/// let edge = SExpr::call("edge", vec![
///     SExpr::list(vec![SExpr::atom("a")]),
///     SExpr::list(vec![SExpr::atom("b")]),
/// ]);
/// assert_eq!(edge.tag(), Some("edge"));
/// assert_eq!(edge.n_args(), 2);
/// assert_eq!(edge.to_string(), "(edge (a) (b))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SExpr {
    Atom(String),
    List(Vec<SExpr>),
}

impl SExpr {
    /// Creates an atom.
    pub fn atom(text: impl Into<String>) -> Self {
        SExpr::Atom(text.into())
    }

    /// Creates a list.
    pub fn list(items: Vec<SExpr>) -> Self {
        SExpr::List(items)
    }

    /// Creates a call: a list whose head is the atom `tag`.
    pub fn call(tag: impl Into<String>, args: Vec<SExpr>) -> Self {
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(SExpr::atom(tag));
        items.extend(args);
        SExpr::List(items)
    }

    /// Returns true if this is an atom.
    pub fn is_atom(&self) -> bool {
        matches!(self, SExpr::Atom(_))
    }

    /// Returns true if this is a list starting with an atom.
    pub fn is_call(&self) -> bool {
        self.tag().is_some()
    }

    /// Returns the atom text if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(text) => Some(text.as_str()),
            SExpr::List(_) => None,
        }
    }

    /// Returns the elements if this is a list.
    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) => Some(items),
            SExpr::Atom(_) => None,
        }
    }

    /// Returns the head atom if this is a call.
    pub fn tag(&self) -> Option<&str> {
        match self {
            SExpr::List(items) => items.first().and_then(SExpr::as_atom),
            SExpr::Atom(_) => None,
        }
    }

    /// Returns the arguments (elements after the tag) if this is a call.
    pub fn args(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) if self.is_call() => Some(&items[1..]),
            _ => None,
        }
    }

    /// Number of arguments after the tag; zero for atoms and non-call lists.
    pub fn n_args(&self) -> usize {
        self.args().map_or(0, <[SExpr]>::len)
    }

    /// Returns the `index`-th argument, counting from 1 (the tag is index 0).
    pub fn arg(&self, index: usize) -> Option<&SExpr> {
        if index == 0 {
            return None;
        }
        self.args()?.get(index - 1)
    }

    /// If this is a one-element list wrapping an atom, returns the atom text.
    ///
    /// Block references in CFG oracles are written as `(name)`.
    pub fn as_singleton_atom(&self) -> Option<&str> {
        match self.as_list()? {
            [only] => only.as_atom(),
            _ => None,
        }
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Atom(text) => f.write_str(text),
            SExpr::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for SExpr {
    fn from(value: &str) -> Self {
        SExpr::atom(value)
    }
}

impl From<String> for SExpr {
    fn from(value: String) -> Self {
        SExpr::Atom(value)
    }
}

impl From<Vec<SExpr>> for SExpr {
    fn from(value: Vec<SExpr>) -> Self {
        SExpr::List(value)
    }
}
