//! Parsing and printing of type reference strings.
//!
//! Supports the syntax an extractor records verbatim from source:
//!
//! | Form | Example |
//! |------|---------|
//! | Simple or dotted name | `User`, `Models.User` |
//! | Generic arguments | `Dictionary<string,List<User>>` |
//! | Array suffixes | `User[]`, `int[,]`, `byte[][]` |
//! | Nullable suffix | `int?`, `User[]?` |
//! | Global alias | `global::System.String` |
//!
//! Anything else (tuples, pointers with parentheses, malformed brackets,
//! generic arguments nested deeper than [`MAX_GENERIC_DEPTH`]) is kept as a
//! single opaque name so it can still be treated as an external reference.

use std::fmt;

/// A suffix applied after the name and generic arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    /// `?`
    Nullable,
    /// `[]` with the given number of dimensions (`[,]` is 2)
    Array(u8),
}

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Name without generic arguments or suffixes
    pub base: String,
    /// Generic arguments in order
    pub arguments: Vec<TypeName>,
    /// Suffixes in source order
    pub suffixes: Vec<Suffix>,
}

impl TypeName {
    /// Parse a reference string, falling back to an opaque name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parser = Parser::new(text);
        match parser.parse_type(0) {
            Some(name) if parser.at_end() => name,
            _ => Self::simple(text.trim()),
        }
    }

    /// A name with no arguments or suffixes.
    #[must_use]
    pub fn simple(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            arguments: Vec::new(),
            suffixes: Vec::new(),
        }
    }

    /// Number of generic arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Every base name in the reference tree, outermost first.
    #[must_use]
    pub fn base_names(&self) -> Vec<&str> {
        let mut names = vec![self.base.as_str()];
        for argument in &self.arguments {
            names.extend(argument.base_names());
        }
        names
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, argument) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        for suffix in &self.suffixes {
            match suffix {
                Suffix::Nullable => f.write_str("?")?,
                Suffix::Array(rank) => {
                    f.write_str("[")?;
                    for _ in 1..*rank {
                        f.write_str(",")?;
                    }
                    f.write_str("]")?;
                }
            }
        }
        Ok(())
    }
}

const GLOBAL_ALIAS: &str = "global::";

/// Deepest generic argument nesting parsed structurally.
pub const MAX_GENERIC_DEPTH: usize = 64;

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.text.len()
    }

    fn parse_type(&mut self, depth: usize) -> Option<TypeName> {
        if depth > MAX_GENERIC_DEPTH {
            return None;
        }
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',' | '[' | ']' | '?') || c.is_whitespace() {
                break;
            }
            if matches!(c, '(' | ')') {
                return None;
            }
            self.bump();
        }
        let raw = &self.text[start..self.pos];
        if raw.is_empty() {
            return None;
        }
        let base = raw.strip_prefix(GLOBAL_ALIAS).unwrap_or(raw);
        if base.is_empty() {
            return None;
        }

        let mut arguments = Vec::new();
        self.skip_ws();
        if self.peek() == Some('<') {
            self.bump();
            loop {
                arguments.push(self.parse_type(depth + 1)?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.bump(),
                    Some('>') => {
                        self.bump();
                        break;
                    }
                    _ => return None,
                }
            }
        }

        let mut suffixes = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('?') => {
                    self.bump();
                    suffixes.push(Suffix::Nullable);
                }
                Some('[') => {
                    self.bump();
                    let mut rank: u8 = 1;
                    loop {
                        self.skip_ws();
                        match self.peek() {
                            Some(',') => {
                                self.bump();
                                rank = rank.saturating_add(1);
                            }
                            Some(']') => {
                                self.bump();
                                break;
                            }
                            _ => return None,
                        }
                    }
                    suffixes.push(Suffix::Array(rank));
                }
                _ => break,
            }
        }

        Some(TypeName {
            base: base.to_string(),
            arguments,
            suffixes,
        })
    }
}
