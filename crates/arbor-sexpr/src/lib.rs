//! S-expression reader and pattern matcher for Arbor.
//!
//! S-expressions are the literal format for structural test oracles over
//! the IR, e.g. the expected edges of a control-flow graph:
//!
//! ```text
//! (trans
//!   (edge (entry) (for.cond))
//!   (edge (for.cond) (for.body)))
//! ```
//!
//! [`reader`] turns text into [`SExpr`] values and [`pattern`] decides
//! whether a value has a given shape, binding the parts a caller asked for.

mod sexpr;
pub mod pattern;
pub mod reader;

pub use pattern::{Binding, Bindings, Pattern, PatternError};
pub use reader::{ParseError, Position, Reader, parse, parse_required, parse_with_sigil};
pub use sexpr::SExpr;
