// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! A minimal symbolic-expression type.
//!
//! This is the wire form for path terms: atoms and lists, printed in a
//! canonical way so that printing a parsed value reproduces the original
//! bytes. Atoms are printed bare unless they contain a delimiter, in which
//! case they are double-quoted with `\"` and `\\` escapes.

use crate::error::{Error, ErrorImpl};

use std::{fmt, str::FromStr};

/// A symbolic expression: an atom or a list of expressions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    /// Shorthand for an atom node.
    pub fn atom(s: impl Into<String>) -> Self {
        Self::Atom(s.into())
    }

    /// Shorthand for a list node.
    pub fn list(items: impl IntoIterator<Item = Sexp>) -> Self {
        Self::List(items.into_iter().collect())
    }
}

/// Whether an atom can be printed without quoting.
fn is_bare(atom: &str) -> bool {
    !atom.is_empty()
        && !atom
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Atom(atom) if is_bare(atom) => f.write_str(atom),
            Sexp::Atom(atom) => {
                f.write_str("\"")?;
                for c in atom.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Sexp::List(items) => {
                f.write_str("(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, description: impl Into<String>) -> Error {
        ErrorImpl::InvalidPath {
            description: format!(
                "serialized form, byte {pos}: {what}",
                pos = self.pos,
                what = description.into()
            )
            .into(),
        }
        .into()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn parse(&mut self) -> Result<Sexp, Error> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('(') => self.parse_list(),
            Some(')') => Err(self.error("unexpected ')'")),
            Some('"') => self.parse_quoted(),
            Some(_) => self.parse_bare(),
        }
    }

    fn parse_list(&mut self) -> Result<Sexp, Error> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated list")),
                Some(')') => {
                    self.bump();
                    return Ok(Sexp::List(items));
                }
                Some(_) => items.push(self.parse()?),
            }
        }
    }

    fn parse_quoted(&mut self) -> Result<Sexp, Error> {
        self.bump();
        let mut atom = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated quoted atom")),
                Some('"') => return Ok(Sexp::Atom(atom)),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => atom.push(c),
                    Some(c) => return Err(self.error(format!("unknown escape '\\{c}'"))),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => atom.push(c),
            }
        }
    }

    fn parse_bare(&mut self) -> Result<Sexp, Error> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\') {
                break;
            }
            self.bump();
        }
        Ok(Sexp::Atom(self.input[start..self.pos].to_owned()))
    }
}

impl FromStr for Sexp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let sexp = parser.parse()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error("trailing bytes after expression"));
        }
        Ok(sexp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    use pretty_assertions::assert_eq;

    fn roundtrip(s: &str) -> String {
        s.parse::<Sexp>().expect("parseable sexp").to_string()
    }

    #[test]
    fn print_atoms() {
        assert_eq!(Sexp::atom("Root").to_string(), "Root");
        assert_eq!(Sexp::atom("").to_string(), "\"\"");
        assert_eq!(Sexp::atom("two words").to_string(), "\"two words\"");
        assert_eq!(Sexp::atom("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Sexp::atom("a\\b").to_string(), "\"a\\\\b\"");
    }

    #[test]
    fn print_lists() {
        let sexp = Sexp::list([
            Sexp::atom("Dir"),
            Sexp::atom("foo"),
            Sexp::list([Sexp::atom("x")]),
        ]);
        assert_eq!(sexp.to_string(), "(Dir foo (x))");
        assert_eq!(Sexp::list([]).to_string(), "()");
    }

    #[test]
    fn parse_then_print_is_identity_on_canonical_input() {
        for s in [
            "Root",
            "(Item Root)",
            "(Cons (Dir a) (Item (File b)))",
            "\"odd atom\"",
            "(a \"b c\" (d))",
            "()",
        ] {
            assert_eq!(roundtrip(s), s, "{s:?} must survive a read/print cycle");
        }
    }

    #[test]
    fn parse_normalizes_whitespace() {
        assert_eq!(roundtrip("  ( a   b\n\t(c) ) "), "(a b (c))");
    }

    #[test]
    fn parse_errors() {
        for s in ["", "(", "(a", ")", "\"abc", "\"\\x\"", "a b"] {
            assert_eq!(
                s.parse::<Sexp>().map_err(|err| err.kind()),
                Err(ErrorKind::InvalidPath),
                "{s:?} must fail to parse"
            );
        }
    }
}
