//! Text reader for S-expressions.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! value := atom | "(" value* ")"
//! atom  := one or more characters other than whitespace, "(" and ")"
//! ```
//!
//! Whitespace is the only separator. A backslash immediately followed by a
//! line break is an escaped line continuation and is removed before
//! tokenizing, so `(edge (a)\` + newline + `(b))` reads the same as
//! `(edge (a)(b))`.

use crate::SExpr;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 1-based line/column position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    const START: Position = Position { line: 1, column: 1 };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that abort reading a top-level value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected ')' at {0}")]
    UnexpectedClose(Position),

    #[error("unclosed '(' opened at {0}")]
    Unclosed(Position),

    #[error("trailing input at {0} after top-level value")]
    TrailingInput(Position),

    #[error("expected an s-expression, found end of input")]
    Empty,
}

enum Token {
    Open(Position),
    Close(Position),
    Atom(String),
}

/// Streaming reader over a fully buffered source text.
///
/// Each call to [`Reader::read`] consumes one top-level value. After an
/// error the reader is exhausted; partially read lists are never returned.
pub struct Reader {
    chars: Vec<char>,
    index: usize,
    pos: Position,
    sigil: Option<char>,
    failed: bool,
}

impl Reader {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            index: 0,
            pos: Position::START,
            sigil: None,
            failed: false,
        }
    }

    /// Strips one leading `sigil` from every atom, so `$entry` reads as `entry`.
    ///
    /// An atom consisting of the sigil alone is kept verbatim.
    pub fn string_sigil(mut self, sigil: char) -> Self {
        self.sigil = Some(sigil);
        self
    }

    /// Reads the next top-level value, or `None` at end of input.
    pub fn read(&mut self) -> Result<Option<SExpr>, ParseError> {
        if self.failed {
            return Ok(None);
        }
        let result = self.read_value();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// Fails with [`ParseError::TrailingInput`] unless only whitespace remains.
    pub fn finish(mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(_) => Err(ParseError::TrailingInput(self.pos)),
            None => Ok(()),
        }
    }

    fn read_value(&mut self) -> Result<Option<SExpr>, ParseError> {
        // Explicit stack so deeply nested input cannot overflow the call stack.
        let mut open: Vec<(Position, Vec<SExpr>)> = Vec::new();
        loop {
            let Some(token) = self.next_token() else {
                return match open.last() {
                    Some((pos, _)) => Err(ParseError::Unclosed(*pos)),
                    None => Ok(None),
                };
            };
            let value = match token {
                Token::Open(pos) => {
                    open.push((pos, Vec::new()));
                    continue;
                }
                Token::Close(pos) => match open.pop() {
                    Some((_, items)) => SExpr::List(items),
                    None => return Err(ParseError::UnexpectedClose(pos)),
                },
                Token::Atom(text) => SExpr::Atom(text),
            };
            match open.last_mut() {
                Some((_, items)) => items.push(value),
                None => return Ok(Some(value)),
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek()? {
            '(' => {
                self.bump();
                Some(Token::Open(start))
            }
            ')' => {
                self.bump();
                Some(Token::Close(start))
            }
            _ => {
                let mut text = String::new();
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                Some(Token::Atom(self.strip_sigil(text)))
            }
        }
    }

    fn strip_sigil(&self, text: String) -> String {
        match self.sigil {
            Some(sigil) if text.len() > sigil.len_utf8() && text.starts_with(sigil) => {
                text[sigil.len_utf8()..].to_string()
            }
            _ => text,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_continuations();
        self.chars.get(self.index).copied()
    }

    fn bump(&mut self) {
        self.skip_continuations();
        if let Some(&c) = self.chars.get(self.index) {
            self.index += 1;
            self.advance_pos(c);
        }
    }

    fn skip_continuations(&mut self) {
        while self.chars.get(self.index) == Some(&'\\') {
            let len = match (self.chars.get(self.index + 1), self.chars.get(self.index + 2)) {
                (Some('\n'), _) => 2,
                (Some('\r'), Some('\n')) => 3,
                _ => return,
            };
            self.index += len;
            self.pos = Position {
                line: self.pos.line + 1,
                column: 1,
            };
        }
    }

    fn advance_pos(&mut self, c: char) {
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
    }
}

impl Iterator for Reader {
    type Item = Result<SExpr, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

/// Parses at most one top-level value from `text`.
///
/// Empty (or all-whitespace) input yields `Ok(None)`. Anything after the
/// first value is an error.
pub fn parse(text: &str) -> Result<Option<SExpr>, ParseError> {
    parse_with(Reader::new(text))
}

/// Like [`parse`], but with a string sigil stripped from atoms.
pub fn parse_with_sigil(text: &str, sigil: char) -> Result<Option<SExpr>, ParseError> {
    parse_with(Reader::new(text).string_sigil(sigil))
}

/// Parses exactly one top-level value; empty input is [`ParseError::Empty`].
pub fn parse_required(text: &str) -> Result<SExpr, ParseError> {
    parse(text)?.ok_or(ParseError::Empty)
}

fn parse_with(mut reader: Reader) -> Result<Option<SExpr>, ParseError> {
    let value = reader.read()?;
    if value.is_some() {
        reader.finish()?;
    }
    Ok(value)
}

impl FromStr for SExpr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_required(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(text: &str) -> SExpr {
        SExpr::atom(text)
    }

    #[test]
    fn test_parse_atom() {
        assert_eq!(parse("hello").unwrap(), Some(atom("hello")));
        assert_eq!(parse("  for.cond.25 \n").unwrap(), Some(atom("for.cond.25")));
    }

    #[test]
    fn test_parse_nested_list() {
        let expr = parse("(edge (a) (b))").unwrap().unwrap();
        assert_eq!(
            expr,
            SExpr::call(
                "edge",
                vec![SExpr::list(vec![atom("a")]), SExpr::list(vec![atom("b")])]
            )
        );
    }

    #[test]
    fn test_parentheses_split_atoms() {
        let expr = parse("(a(b)c)").unwrap().unwrap();
        assert_eq!(
            expr,
            SExpr::list(vec![atom("a"), SExpr::list(vec![atom("b")]), atom("c")])
        );
    }

    #[test]
    fn test_empty_input_is_no_value() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse(" \n\t ").unwrap(), None);
        assert_eq!(parse_required("  "), Err(ParseError::Empty));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(parse("()").unwrap(), Some(SExpr::list(vec![])));
    }

    #[test]
    fn test_unexpected_close() {
        assert_eq!(
            parse(")"),
            Err(ParseError::UnexpectedClose(Position { line: 1, column: 1 }))
        );
    }

    #[test]
    fn test_unclosed_list_reports_opening_position() {
        assert_eq!(
            parse("(trans\n  (edge (a) (b))"),
            Err(ParseError::Unclosed(Position { line: 1, column: 1 }))
        );
        assert_eq!(
            parse("(trans\n  (edge (a) (b)"),
            Err(ParseError::Unclosed(Position { line: 2, column: 3 }))
        );
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(
            parse("(a) b"),
            Err(ParseError::TrailingInput(Position { line: 1, column: 5 }))
        );
        assert!(matches!(parse("(a))"), Err(ParseError::TrailingInput(_))));
    }

    #[test]
    fn test_line_continuation_between_tokens() {
        let text = "(trans\\\n  (edge (a) (b))\\\n  (edge (b) (c)))";
        let expected = parse("(trans (edge (a) (b)) (edge (b) (c)))").unwrap();
        assert_eq!(parse(text).unwrap(), expected);
    }

    #[test]
    fn test_line_continuation_crlf() {
        let text = "(edge (a)\\\r\n(b))";
        assert_eq!(parse(text).unwrap(), parse("(edge (a) (b))").unwrap());
    }

    #[test]
    fn test_line_continuation_joins_atom() {
        assert_eq!(parse("for.\\\ncond").unwrap(), Some(atom("for.cond")));
    }

    #[test]
    fn test_backslash_without_newline_is_atom_text() {
        assert_eq!(parse("a\\b").unwrap(), Some(atom("a\\b")));
    }

    #[test]
    fn test_position_after_continuation() {
        assert_eq!(
            parse("(a\\\n ))"),
            Err(ParseError::TrailingInput(Position { line: 2, column: 3 }))
        );
    }

    #[test]
    fn test_string_sigil() {
        let expr = parse_with_sigil("($edge ($*in_entry_phi) ($for.cond))", '$')
            .unwrap()
            .unwrap();
        assert_eq!(expr.tag(), Some("edge"));
        assert_eq!(expr.arg(1).unwrap().as_singleton_atom(), Some("*in_entry_phi"));
        assert_eq!(expr.arg(2).unwrap().as_singleton_atom(), Some("for.cond"));
    }

    #[test]
    fn test_lone_sigil_is_kept() {
        assert_eq!(parse_with_sigil("$", '$').unwrap(), Some(atom("$")));
    }

    #[test]
    fn test_reader_streams_values() {
        let reader = Reader::new("(a) b\n(c (d))");
        let values: Result<Vec<_>, _> = reader.collect();
        let values = values.unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], atom("b"));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader = Reader::new(") (a)");
        assert!(reader.read().is_err());
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let text = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let mut expr = parse(&text).unwrap().unwrap();
        let mut seen = 0;
        while let SExpr::List(mut items) = expr {
            expr = items.pop().unwrap();
            seen += 1;
        }
        assert_eq!(seen, depth);
        assert_eq!(expr, atom("x"));
    }

    #[test]
    fn test_from_str() {
        let expr: SExpr = "(trans)".parse().unwrap();
        assert_eq!(expr.tag(), Some("trans"));
        assert_eq!(expr.n_args(), 0);
    }
}
