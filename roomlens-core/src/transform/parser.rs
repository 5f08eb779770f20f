//! Literal-call parser for transform strings
//!
//! Transform strings look like function calls but are never executed as
//! code. The accepted grammar is deliberately tiny:
//!
//! ```text
//! call    := ident [ '(' [ arg { ',' arg } [','] ] ')' ]
//! arg     := ident '=' literal | literal
//! literal := number | string | '[' [ literal { ',' literal } [','] ] ']'
//! number  := ['+' | '-'] digits ['.' digits] [('e' | 'E') ['+' | '-'] digits]
//! string  := '"' chars '"' | '\'' chars '\''
//! ```
//!
//! Positional arguments must come before keyword arguments and a keyword
//! may appear once. Bare identifiers are only legal as the call name and as
//! keyword names; there are no variables, operators or nested calls. Lists
//! nest at most [`MAX_LIST_DEPTH`] deep.

use crate::errors::{MappingError, MappingResult};

/// Deepest list nesting a literal may use
pub const MAX_LIST_DEPTH: usize = 32;

/// Literal value in a transform call
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Any numeric literal
    Number(f64),
    /// Quoted string
    Str(String),
    /// Bracketed list, possibly nested
    List(Vec<Literal>),
}

impl Literal {
    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parsed transform call: name plus arguments
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCall {
    /// Registered curve name
    pub name: String,
    /// Positional arguments in order
    pub args: Vec<Literal>,
    /// Keyword arguments in order
    pub kwargs: Vec<(String, Literal)>,
}

impl TransformCall {
    /// Parse a transform string
    pub fn parse(spec: &str) -> MappingResult<Self> {
        let mut parser = Parser::new(spec);
        let call = parser.call()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(call)
    }

    /// Keyword argument by name
    pub fn kwarg(&self, name: &str) -> Option<&Literal> {
        self.kwargs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn error(&self, reason: &str) -> MappingError {
        MappingError::TransformSyntax {
            spec: self.src.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
            feature: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> MappingResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn call(&mut self) -> MappingResult<TransformCall> {
        self.skip_ws();
        let name = self
            .ident()
            .ok_or_else(|| self.error("expected transform name"))?;

        let mut call = TransformCall {
            name,
            args: Vec::new(),
            kwargs: Vec::new(),
        };

        if !self.eat('(') {
            return Ok(call);
        }

        loop {
            if self.eat(')') {
                return Ok(call);
            }
            self.argument(&mut call)?;
            if self.eat(',') {
                continue;
            }
            self.expect(')')?;
            return Ok(call);
        }
    }

    fn argument(&mut self, call: &mut TransformCall) -> MappingResult<()> {
        self.skip_ws();
        let start = self.pos;

        if let Some(keyword) = self.ident() {
            if !self.eat('=') {
                self.pos = start;
                return Err(self.error("bare names are not allowed as values"));
            }
            if call.kwargs.iter().any(|(k, _)| *k == keyword) {
                self.pos = start;
                return Err(self.error(&format!("keyword '{}' repeated", keyword)));
            }
            let value = self.literal()?;
            call.kwargs.push((keyword, value));
            return Ok(());
        }

        if !call.kwargs.is_empty() {
            return Err(self.error("positional argument follows keyword argument"));
        }
        let value = self.literal()?;
        call.args.push(value);
        Ok(())
    }

    fn ident(&mut self) -> Option<String> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(rest[..end].to_string())
    }

    fn literal(&mut self) -> MappingResult<Literal> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.list(),
            Some('"') | Some('\'') => self.string().map(Literal::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => {
                self.number().map(Literal::Number)
            }
            Some(_) => Err(self.error("expected a number, string or list")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn list(&mut self) -> MappingResult<Literal> {
        self.expect('[')?;
        if self.depth >= MAX_LIST_DEPTH {
            return Err(self.error("list nesting too deep"));
        }
        self.depth += 1;
        let items = self.list_items();
        self.depth -= 1;
        items.map(Literal::List)
    }

    fn list_items(&mut self) -> MappingResult<Vec<Literal>> {
        let mut items = Vec::new();
        loop {
            if self.eat(']') {
                return Ok(items);
            }
            items.push(self.literal()?);
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            return Ok(items);
        }
    }

    fn string(&mut self) -> MappingResult<String> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(_) => return Err(self.error("unknown escape sequence")),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> MappingResult<f64> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }

        let mut digits = self.digits();
        if self.peek() == Some('.') {
            self.bump();
            digits += self.digits();
        }
        if digits == 0 {
            return Err(self.error("malformed number"));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.digits() == 0 {
                return Err(self.error("malformed exponent"));
            }
        }

        self.src[start..self.pos]
            .parse::<f64>()
            .map_err(|_| self.error("malformed number"))
    }

    fn digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
            count += 1;
        }
        count
    }
}
